//! Integration tests for host matching and list reconciliation

use hl_core::policy::{host_from_url, matches, reconcile, PolicyList, Resolution};
use proptest::prelude::*;

fn list(entries: &[&str]) -> PolicyList {
    PolicyList::normalize(entries)
}

fn domain() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,6}", 1..4).prop_map(|labels| labels.join("."))
}

fn domain_list() -> impl Strategy<Value = PolicyList> {
    prop::collection::vec(prop::sample::select(vec![
        "a.com", "b.com", "c.org", "d.net", "e.io", "f.dev",
    ]), 0..6)
    .prop_map(|entries| PolicyList::normalize(entries))
}

proptest! {
    #[test]
    fn matcher_is_exact_or_dotted_suffix(host in domain(), entry in domain()) {
        let expected = host == entry || host.ends_with(&format!(".{entry}"));
        prop_assert_eq!(matches(&host, [entry.as_str()]), expected);
    }

    #[test]
    fn matcher_accepts_every_subdomain(sub in domain(), entry in domain()) {
        let host = format!("{sub}.{entry}");
        prop_assert!(matches(&host, [entry.as_str()]));
        prop_assert!(matches(&host.to_uppercase(), [entry.as_str()]));
    }

    #[test]
    fn reconcile_output_is_disjoint(
        allow in domain_list(),
        block in domain_list(),
        last_allow in domain_list(),
        last_block in domain_list(),
        answer in any::<bool>(),
    ) {
        let out = reconcile(&allow, &block, &last_allow, &last_block, |_| answer);
        for entry in out.snapshot.allowlist.iter() {
            prop_assert!(!out.snapshot.blocklist.contains(entry));
        }
    }

    #[test]
    fn reconcile_never_drops_an_entry(
        allow in domain_list(),
        block in domain_list(),
        last_allow in domain_list(),
        last_block in domain_list(),
        answer in any::<bool>(),
    ) {
        let out = reconcile(&allow, &block, &last_allow, &last_block, |_| answer);
        for entry in allow.iter().chain(block.iter()) {
            prop_assert!(
                out.snapshot.allowlist.contains(entry) || out.snapshot.blocklist.contains(entry),
                "{} vanished", entry
            );
        }
    }

    #[test]
    fn reconcile_is_idempotent(
        allow in domain_list(),
        block in domain_list(),
        answer in any::<bool>(),
    ) {
        let once = reconcile(&allow, &block, &allow, &block, |_| answer).snapshot;
        let twice = reconcile(&once.allowlist, &once.blocklist, &once.allowlist, &once.blocklist, |_| answer).snapshot;
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn confirm_only_asked_for_moves(
        allow in domain_list(),
        block in domain_list(),
        last_allow in domain_list(),
        last_block in domain_list(),
    ) {
        let mut asked = Vec::new();
        reconcile(&allow, &block, &last_allow, &last_block, |entry| {
            asked.push(entry.to_string());
            true
        });
        for entry in &asked {
            prop_assert!(!last_allow.contains(entry));
            prop_assert!(last_block.contains(entry));
        }
        let mut unique = asked.clone();
        unique.dedup();
        prop_assert_eq!(unique.len(), asked.len());
    }
}

#[test]
fn test_move_from_block_confirmed() {
    let out = reconcile(&list(&["x.com"]), &list(&["x.com"]), &list(&[]), &list(&["x.com"]), |_| true);
    assert_eq!(out.snapshot.allowlist.to_vec(), vec!["x.com"]);
    assert!(out.snapshot.blocklist.is_empty());
    assert_eq!(out.resolutions, vec![Resolution::MovedToAllow("x.com".into())]);
    assert!(out.notice_message().is_none());
}

#[test]
fn test_move_from_block_declined() {
    let out = reconcile(&list(&["x.com"]), &list(&["x.com"]), &list(&[]), &list(&["x.com"]), |_| false);
    assert!(out.snapshot.allowlist.is_empty());
    assert_eq!(out.snapshot.blocklist.to_vec(), vec!["x.com"]);
}

#[test]
fn test_simultaneous_add_block_wins() {
    let out = reconcile(&list(&["y.com"]), &list(&["y.com"]), &list(&[]), &list(&[]), |_| {
        panic!("no confirmation expected")
    });
    assert!(out.snapshot.allowlist.is_empty());
    assert_eq!(out.snapshot.blocklist.to_vec(), vec!["y.com"]);
    assert_eq!(
        out.notice_message().as_deref(),
        Some("Lists updated: y.com kept on the blocklist only.")
    );
}

#[test]
fn test_host_from_url_feeds_matcher() {
    let host = host_from_url("https://User@News.YCombinator.com:443/item?id=1").unwrap();
    assert_eq!(host, "news.ycombinator.com");
    assert!(matches(&host, ["ycombinator.com"]));
    assert!(!matches(&host, ["combinator.com"]));
}
