//! Property tests for ordered fallback resolution.

use locus::mock::{MockElement, MockPage};
use locus::{resolve_traced, ElementHandle, PageContext, Selector, SelectorList};
use proptest::prelude::*;
use std::future::Future;
use std::sync::Arc;

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

/// `n` strategies, strategy `i` being `[data-s="i"]`
fn strategies(n: usize) -> SelectorList {
    let selectors: Vec<Selector> = (0..n)
        .map(|i| Selector::css(format!("[data-s=\"{i}\"]")))
        .collect();
    SelectorList::try_from(selectors).unwrap()
}

fn page_matching(present: &[usize]) -> MockPage {
    MockPage::with_elements(
        present
            .iter()
            .map(|i| MockElement::new("div").attr("data-s", i.to_string()).text(format!("s{i}")))
            .collect(),
    )
}

proptest! {
    #[test]
    fn prop_first_matching_strategy_wins(n in 1usize..8, k in 0usize..8) {
        let k = k % n;
        let page = page_matching(&[k]);
        let list = strategies(n);

        let resolution = block_on(async {
            let ctx: Arc<dyn PageContext> = Arc::new(page.clone());
            resolve_traced(ctx.as_ref(), &list).await.unwrap()
        });

        prop_assert_eq!(resolution.matched, Some(k));
        // Strategies after the winner are never probed
        prop_assert_eq!(resolution.attempts.len(), k + 1);
        prop_assert_eq!(page.probe_count(), k + 1);
        // Each earlier strategy tried once, in order, and recorded as a miss
        for (i, attempt) in resolution.attempts.iter().enumerate() {
            prop_assert_eq!(attempt.index, i);
            prop_assert_eq!(&attempt.selector, &format!("css=[data-s=\"{i}\"]"));
            prop_assert_eq!(attempt.count.is_some(), i == k);
            prop_assert!(attempt.error.is_none());
        }
        let text = block_on(resolution.handle.text_content()).unwrap();
        prop_assert_eq!(text, Some(format!("s{k}")));
    }

    #[test]
    fn prop_earlier_strategy_shadows_later(n in 2usize..8, picks in proptest::collection::btree_set(0usize..8, 1..4)) {
        let present: Vec<usize> = picks.into_iter().filter(|i| *i < n).collect();
        prop_assume!(!present.is_empty());
        let page = page_matching(&present);
        let list = strategies(n);

        let resolution = block_on(async {
            let ctx: Arc<dyn PageContext> = Arc::new(page.clone());
            resolve_traced(ctx.as_ref(), &list).await.unwrap()
        });

        prop_assert_eq!(resolution.matched, Some(present[0]));
        prop_assert_eq!(page.probe_count(), present[0] + 1);
        let tried: Vec<usize> = resolution.attempts.iter().map(|a| a.index).collect();
        prop_assert_eq!(tried, (0..=present[0]).collect::<Vec<_>>());
    }

    #[test]
    fn prop_total_miss_returns_preferred_strategy(n in 1usize..8) {
        let page = page_matching(&[]);
        let list = strategies(n);

        let resolution = block_on(async {
            let ctx: Arc<dyn PageContext> = Arc::new(page.clone());
            resolve_traced(ctx.as_ref(), &list).await.unwrap()
        });

        prop_assert!(!resolution.is_match());
        prop_assert_eq!(resolution.attempts.len(), n);
        prop_assert_eq!(page.probe_count(), n);
        prop_assert_eq!(resolution.handle.describe(), "css=[data-s=\"0\"]");
    }
}
