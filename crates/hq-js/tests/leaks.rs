//! Process-wide handle accounting
//!
//! Kept in its own test binary: `live_handles` counts every instance in the
//! process, so no other test may run alongside it.

use hq_js::*;

#[test]
fn test_repeated_instances_release_all_handles() {
    assert_eq!(live_handles().total(), 0);

    for round in 0..50 {
        let mut instance = Instance::new(&BridgeConfig::default()).unwrap();
        instance
            .exec(
                r#"
                var h = htmlParser('<table class="comment-tree" border="1"><tr><td>a</td><td>b</td></tr></table>');
                var f = h.find('table.comment-tree');
                f.find('td').map(function (td) { return td.text(); });
                f.attr('border');
            "#,
            )
            .unwrap();

        let live = live_handles();
        assert_eq!(live.documents, 1, "round {}", round);
        assert_eq!(live.selections, 4, "round {}", round);

        if round % 2 == 0 {
            instance.dispose();
        }
        // Odd rounds rely on Drop
    }

    assert_eq!(live_handles(), HandleCounts::default());
}
