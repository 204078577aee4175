//! WASM bindings for rewriting text inside a browser page.
//!
//! Exposes `markOver({ html, skipTags }, transform)` to JavaScript. The
//! transform receives `{ key, text, tag: { name, id, classList } }` and may
//! return a string or a Promise of one.

use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::{Fragment, MarkOverOptions, Runtime, mark_over_in};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Rewrite the text of `options.html` with `transform`, using the page's DOM.
///
/// `options.skipTags` is optional and extends the default skip list.
/// Rejects if the options are malformed, if the page has no DOM, or with the
/// first error a transform call throws or rejects with.
#[wasm_bindgen(js_name = markOver)]
pub async fn mark_over(options: JsValue, transform: Function) -> Result<String, JsValue> {
    let options = read_options(&options)?;
    let transform = &transform;

    mark_over_in(Runtime::Browser, options, |fragment| {
        call_transform(transform, fragment)
    })
    .await
    .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Read a `{ html, skipTags }` object.
fn read_options(options: &JsValue) -> Result<MarkOverOptions, JsValue> {
    if !options.is_object() {
        return Err(JsValue::from_str("markOver: options must be an object"));
    }
    let html = Reflect::get(options, &"html".into())?
        .as_string()
        .ok_or_else(|| JsValue::from_str("markOver: options.html must be a string"))?;

    let skip = Reflect::get(options, &"skipTags".into())?;
    let mut tags = Vec::new();
    if !skip.is_undefined() && !skip.is_null() {
        if !Array::is_array(&skip) {
            return Err(JsValue::from_str("markOver: options.skipTags must be an array"));
        }
        for tag in Array::from(&skip).iter() {
            let tag = tag
                .as_string()
                .ok_or_else(|| JsValue::from_str("markOver: options.skipTags must hold strings"))?;
            tags.push(tag);
        }
    }

    Ok(MarkOverOptions::new(html).skip_tags(tags))
}

async fn call_transform(transform: &Function, fragment: Fragment) -> Result<String, String> {
    let arg = fragment_to_js(&fragment).map_err(describe)?;
    let returned = transform.call1(&JsValue::NULL, &arg).map_err(describe)?;
    let value = match returned.dyn_into::<Promise>() {
        Ok(promise) => JsFuture::from(promise).await.map_err(describe)?,
        Err(value) => value,
    };
    value
        .as_string()
        .ok_or_else(|| format!("transform for fragment {} did not return a string", fragment.key))
}

fn fragment_to_js(fragment: &Fragment) -> Result<JsValue, JsValue> {
    let tag = Object::new();
    Reflect::set(&tag, &"name".into(), &fragment.tag.name.as_str().into())?;
    let id = fragment
        .tag
        .id
        .as_deref()
        .map_or(JsValue::NULL, JsValue::from_str);
    Reflect::set(&tag, &"id".into(), &id)?;
    let classes = match &fragment.tag.class_list {
        Some(list) => list
            .iter()
            .map(|c| JsValue::from_str(c))
            .collect::<Array>()
            .into(),
        None => JsValue::NULL,
    };
    Reflect::set(&tag, &"classList".into(), &classes)?;

    let object = Object::new();
    Reflect::set(&object, &"key".into(), &JsValue::from_f64(fragment.key.0 as f64))?;
    Reflect::set(&object, &"text".into(), &fragment.text.as_str().into())?;
    Reflect::set(&object, &"tag".into(), &tag)?;
    Ok(object.into())
}

fn describe(value: JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use wasm_bindgen_test::wasm_bindgen_test;

    use super::*;

    fn options(html: &JsValue, skip_tags: Option<&[&str]>) -> JsValue {
        let object = Object::new();
        Reflect::set(&object, &"html".into(), html).unwrap();
        if let Some(tags) = skip_tags {
            let tags: Array = tags.iter().map(|t| JsValue::from_str(t)).collect();
            Reflect::set(&object, &"skipTags".into(), &tags).unwrap();
        }
        object.into()
    }

    #[wasm_bindgen_test]
    fn test_reads_html_and_skip_tags() {
        let read = read_options(&options(&"<p>x</p>".into(), Some(&["PRE"]))).unwrap();

        assert_eq!(read.html(), "<p>x</p>");
        assert!(read.skip_set().contains("PRE"));
        assert!(read.skip_set().contains("SCRIPT"));
    }

    #[wasm_bindgen_test]
    fn test_skip_tags_are_optional() {
        let read = read_options(&options(&"<p>x</p>".into(), None)).unwrap();

        assert_eq!(read.skip_set(), &crate::SkipTags::default());
    }

    #[wasm_bindgen_test]
    fn test_rejects_malformed_options() {
        assert!(read_options(&JsValue::from_str("<p>x</p>")).is_err());
        assert!(read_options(&options(&JsValue::from_f64(1.0), None)).is_err());
    }
}
