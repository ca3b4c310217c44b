//! Injected scripts the engine runs through [`crate::BrowserAdapter::execute_script`].
//!
//! Kept as named constants so scripted backends can answer them
//! deterministically while a CDP-backed driver evaluates them for real.

/// Ids of every element on the page, for the DOM snapshot.
pub const COLLECT_ELEMENT_IDS: &str =
    "return Array.from(document.querySelectorAll('[id]')).map(function(el) { return el.id; });";

/// Full markup, lowercased downstream, for provider-name text matching.
pub const COLLECT_PAGE_TEXT: &str = "return document.documentElement.outerHTML;";

/// Scroll the viewport and report whether the offset moved.
pub const SCROLL_PROBE: &str = "var before = window.pageYOffset; \
     window.scrollTo(0, 100); \
     return window.pageYOffset !== before;";

/// Whether a neutral in-page element actually receives the click, or an
/// overlay intercepts it.
pub const NEUTRAL_CLICK_PROBE: &str = "var links = document.getElementsByTagName('a'); \
     for (var i = 0; i < links.length; i++) { \
         var rect = links[i].getBoundingClientRect(); \
         if (rect.width === 0 || rect.height === 0) { continue; } \
         var cx = rect.left + rect.width / 2; \
         var cy = rect.top + rect.height / 2; \
         if (document.elementFromPoint(cx, cy) === links[i]) { return true; } \
     } \
     return false;";

/// Document ready-state poll used while waiting for page load.
pub const PAGE_READY: &str = "return document.readyState === 'complete';";
