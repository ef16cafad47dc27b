use wasm_bindgen::prelude::*;

// This allows us to access console.log and console.error from JS
#[wasm_bindgen]
extern "C" {
    // Use `js_namespace` to bind `console.log(..)` instead of just `log(..)`
    #[wasm_bindgen(js_namespace = console)]
    pub fn log(s: &str);

    // Ingest failures go through console.error so they stand out in devtools
    #[wasm_bindgen(js_namespace = console)]
    pub fn error(s: &str);
}

// Note: the console_log!/console_error! macros are defined in lib.rs
