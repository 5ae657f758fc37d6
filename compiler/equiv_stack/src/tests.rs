use super::*;

#[test]
fn nested_sum_survives_deep_recursion() {
    fn nested_sum(depth: u64) -> u64 {
        ensure_sufficient_stack(|| if depth == 0 { 0 } else { nested_sum(depth - 1) + depth })
    }

    // Far deeper than a default 8MB thread stack allows without growth.
    assert_eq!(nested_sum(200_000), 200_000 * 200_001 / 2);
}

#[test]
fn passes_results_through() {
    let parsed: Result<u8, String> = ensure_sufficient_stack(|| Err("unexpected indent".to_string()));
    assert_eq!(parsed, Err("unexpected indent".to_string()));
}
