#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

use nc_wasm::{compile_filter_lists, Cleaner};

fn lists(texts: &[&str]) -> JsValue {
    let array = js_sys::Array::new();
    for text in texts {
        array.push(&JsValue::from_str(text));
    }
    array.into()
}

#[wasm_bindgen_test]
fn cleaner_strips_params() {
    let cleaner = Cleaner::new(lists(&["||example.com^$removeparam=fbclid"])).unwrap();
    assert_eq!(cleaner.rule_count(), 1);
    assert_eq!(
        cleaner.clean("https://example.com/?fbclid=1&q=2").as_deref(),
        Some("https://example.com/?q=2")
    );
}

#[wasm_bindgen_test]
fn rejects_empty_input() {
    assert!(Cleaner::new(lists(&[])).is_err());
    assert!(compile_filter_lists(lists(&[])).is_err());
}

#[wasm_bindgen_test]
fn reports_list_stats() {
    let result = compile_filter_lists(lists(&["*$removeparam=a\n*$removeparam=a", "! c"])).unwrap();
    let rules = js_sys::Reflect::get(&result, &"rules".into()).unwrap();
    let deduped = js_sys::Reflect::get(&result, &"rulesDeduped".into()).unwrap();
    assert_eq!(rules.as_f64(), Some(1.0));
    assert_eq!(deduped.as_f64(), Some(1.0));
}
