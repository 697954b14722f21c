//! WebAssembly bindings for Nutcracker

use wasm_bindgen::prelude::*;

use nc_compiler::{compile_sources, FilterSource, SourceSetReport};
use nc_core::UrlCleaner;

/// Compile list texts and report per-list statistics.
#[wasm_bindgen]
pub fn compile_filter_lists(list_texts: JsValue) -> Result<JsValue, JsValue> {
    let texts = collect_texts(&list_texts)?;
    let report = compile_texts(&texts);

    let js_result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&js_result, &"rules".into(), &JsValue::from(report.rules.len() as u32));
    let _ = js_sys::Reflect::set(
        &js_result,
        &"exceptions".into(),
        &JsValue::from(report.rules.exception_count() as u32),
    );
    let _ = js_sys::Reflect::set(&js_result, &"rulesDeduped".into(), &JsValue::from(report.deduped as u32));

    let list_stats = js_sys::Array::new_with_length(report.lists.len() as u32);
    for (i, list) in report.lists.iter().enumerate() {
        let stat = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&stat, &"lines".into(), &JsValue::from(list.stats.lines as u32));
        let _ = js_sys::Reflect::set(&stat, &"rules".into(), &JsValue::from(list.stats.rules as u32));
        let _ = js_sys::Reflect::set(&stat, &"malformed".into(), &JsValue::from(list.stats.malformed as u32));
        list_stats.set(i as u32, stat.into());
    }
    let _ = js_sys::Reflect::set(&js_result, &"listStats".into(), &list_stats);

    Ok(js_result.into())
}

/// A cleaner bound to the rules compiled from a set of list texts.
///
/// Build a new `Cleaner` to pick up refreshed lists; an existing one never
/// changes.
#[wasm_bindgen]
pub struct Cleaner {
    inner: UrlCleaner,
}

#[wasm_bindgen]
impl Cleaner {
    #[wasm_bindgen(constructor)]
    pub fn new(list_texts: JsValue) -> Result<Cleaner, JsValue> {
        let texts = collect_texts(&list_texts)?;
        Ok(Self::from_texts(&texts))
    }

    /// Cleaned URL, or `undefined` when nothing was removed.
    pub fn clean(&self, url: &str) -> Option<String> {
        self.inner.clean(url)
    }

    #[wasm_bindgen(getter, js_name = ruleCount)]
    pub fn rule_count(&self) -> u32 {
        self.inner.rules().len() as u32
    }
}

impl Cleaner {
    fn from_texts(texts: &[String]) -> Self {
        Self {
            inner: UrlCleaner::new(compile_texts(texts).rules),
        }
    }
}

fn collect_texts(list_texts: &JsValue) -> Result<Vec<String>, JsValue> {
    let list_array = js_sys::Array::from(list_texts);
    if list_array.length() == 0 {
        return Err(JsValue::from_str("No list texts provided"));
    }

    list_array
        .iter()
        .map(|value| {
            value
                .as_string()
                .ok_or_else(|| JsValue::from_str("List text must be a string"))
        })
        .collect()
}

fn compile_texts(texts: &[String]) -> SourceSetReport {
    let sources: Vec<FilterSource> = (0..texts.len())
        .map(|idx| FilterSource::new(format!("list-{idx}"), idx.to_string()))
        .collect();

    compile_sources(&sources, "", |source| {
        source
            .url
            .parse::<usize>()
            .ok()
            .and_then(|idx| texts.get(idx).cloned())
    })
}
