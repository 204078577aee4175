//! The `mark_over` pipeline: parse, collect, transform all, rebuild.

use std::convert::Infallible;
use std::future::{Future, Ready, ready};
use std::num::NonZeroUsize;

use futures::stream::{self, FuturesUnordered, StreamExt, TryStreamExt};

use crate::dom::ArenaDom;
use crate::engine::{Runtime, TreeEngine};
use crate::error::{BoxError, Error, Result};
use crate::text::{self, Fragment, MatchPolicy, SkipTags, TransformedFragment};

/// Input and knobs for one [`mark_over`] call.
#[derive(Debug, Clone)]
pub struct MarkOverOptions {
    html: String,
    skip_tags: SkipTags,
    policy: MatchPolicy,
    concurrency: Option<NonZeroUsize>,
}

impl MarkOverOptions {
    /// Options for `html` with the default skip tags, first-match policy and
    /// unbounded transform concurrency.
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            skip_tags: SkipTags::default(),
            policy: MatchPolicy::default(),
            concurrency: None,
        }
    }

    /// Skip these tag names in addition to the defaults.
    pub fn skip_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_tags.extend(tags);
        self
    }

    /// Replace the whole skip set, defaults included.
    pub fn with_skip_set(mut self, skip_tags: SkipTags) -> Self {
        self.skip_tags = skip_tags;
        self
    }

    pub fn policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Cap the number of transforms in flight at once.
    pub fn concurrency(mut self, limit: NonZeroUsize) -> Self {
        self.concurrency = Some(limit);
        self
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn skip_set(&self) -> &SkipTags {
        &self.skip_tags
    }
}

/// Rewrite the text of an HTML fragment with the native tree engine.
///
/// `transform` is called once per collected [`Fragment`]; all calls are
/// started without waiting on each other. The returned string is the
/// serialized content of the rebuilt `<body>`. If any transform fails, the
/// whole call fails with [`Error::Transform`] and nothing is rebuilt.
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
///
/// use markover::{MarkOverOptions, mark_over};
///
/// let html = r#"<div><p class="a">Hello</p><p class="b">World</p></div>"#;
/// let out = futures::executor::block_on(mark_over(MarkOverOptions::new(html), |fragment| async move {
///     Ok::<_, Infallible>(fragment.text.to_uppercase())
/// }))
/// .unwrap();
///
/// assert_eq!(out, r#"<div><p class="a">HELLO</p><p class="b">WORLD</p></div>"#);
/// ```
pub async fn mark_over<F, Fut, E>(options: MarkOverOptions, transform: F) -> Result<String>
where
    F: Fn(Fragment) -> Fut,
    Fut: Future<Output = std::result::Result<String, E>>,
    E: Into<BoxError>,
{
    Runtime::Node.ensure_available()?;
    mark_over_with::<ArenaDom, _, _, _>(options, transform).await
}

/// Rewrite the text of an HTML fragment with an explicitly chosen runtime.
pub async fn mark_over_in<F, Fut, E>(
    runtime: Runtime,
    options: MarkOverOptions,
    transform: F,
) -> Result<String>
where
    F: Fn(Fragment) -> Fut,
    Fut: Future<Output = std::result::Result<String, E>>,
    E: Into<BoxError>,
{
    runtime.ensure_available()?;
    match runtime {
        Runtime::Node => mark_over_with::<ArenaDom, _, _, _>(options, transform).await,
        #[cfg(all(feature = "wasm", target_arch = "wasm32"))]
        Runtime::Browser => {
            mark_over_with::<crate::engine::BrowserDom, _, _, _>(options, transform).await
        }
        #[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
        Runtime::Browser => Err(runtime.mismatch()),
    }
}

/// Rewrite the text of an HTML fragment with tree engine `T`.
///
/// Performs no environment checks.
pub async fn mark_over_with<T, F, Fut, E>(options: MarkOverOptions, transform: F) -> Result<String>
where
    T: TreeEngine,
    F: Fn(Fragment) -> Fut,
    Fut: Future<Output = std::result::Result<String, E>>,
    E: Into<BoxError>,
{
    let MarkOverOptions {
        html,
        skip_tags,
        policy,
        concurrency,
    } = options;

    let (mut engine, body) = T::parse_body(&html)?;
    let fragments = text::collect(&engine, &body, &skip_tags);
    let transformed = transform_all(fragments, transform, concurrency).await?;
    let rebuilt = text::rebuild(&mut engine, &body, &transformed, &skip_tags, policy)?;
    engine.inner_html(&rebuilt)
}

/// Apply `transform` to every fragment and wait for all of them.
///
/// Results keep the order of `fragments`. Calls complete in any order, and
/// the first one to fail, wherever it sits, cancels the transforms still
/// pending and is returned.
pub async fn transform_all<F, Fut, E>(
    fragments: Vec<Fragment>,
    transform: F,
    concurrency: Option<NonZeroUsize>,
) -> Result<Vec<TransformedFragment>>
where
    F: Fn(Fragment) -> Fut,
    Fut: Future<Output = std::result::Result<String, E>>,
    E: Into<BoxError>,
{
    let total = fragments.len();
    let transform = &transform;
    let pending = fragments.into_iter().enumerate().map(move |(index, fragment)| {
        let call = transform(fragment.clone());
        async move {
            match call.await {
                Ok(transformed) => Ok((index, TransformedFragment::new(fragment, transformed))),
                Err(source) => Err(Error::Transform {
                    key: fragment.key,
                    source: source.into(),
                }),
            }
        }
    });

    let mut indexed: Vec<(usize, TransformedFragment)> = match concurrency {
        None => pending.collect::<FuturesUnordered<_>>().try_collect().await?,
        Some(limit) => {
            stream::iter(pending)
                .buffer_unordered(limit.get())
                .try_collect()
                .await?
        }
    };
    indexed.sort_unstable_by_key(|(index, _)| *index);
    tracing::debug!(total, ?concurrency, "transformed all fragments");
    Ok(indexed.into_iter().map(|(_, transformed)| transformed).collect())
}

/// Adapt a synchronous, infallible text function into a transform.
///
/// ```
/// use markover::{MarkOverOptions, mark_over, sync_transform};
///
/// let out = futures::executor::block_on(mark_over(
///     MarkOverOptions::new("<div><script>ignore()</script><p>Keep</p></div>"),
///     sync_transform(|fragment| fragment.text.chars().rev().collect()),
/// ))
/// .unwrap();
///
/// assert_eq!(out, "<div><script>ignore()</script><p>peeK</p></div>");
/// ```
pub fn sync_transform<F>(f: F) -> impl Fn(Fragment) -> Ready<std::result::Result<String, Infallible>>
where
    F: Fn(&Fragment) -> String,
{
    move |fragment| ready(Ok(f(&fragment)))
}
