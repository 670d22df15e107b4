//! Builds that fail, and recovery afterwards

use crate::common::{Fixture, ImportWalker, Layout};
use dependency_funnel::{BuildOutcome, Funnel, FunnelError, FunnelOptions};

#[test]
fn test_walker_failure_keeps_previous_output_and_state() {
    let fx = Fixture::new(Layout::Flat);
    let mut funnel = fx.funnel(FunnelOptions::include("routes.js"));
    funnel.build().unwrap();
    let listing = fx.output_listing();

    fx.rewrite("routes.js", "import");

    let err = funnel.build().unwrap_err();
    assert!(matches!(err, FunnelError::Walker(_)));
    assert!(err.to_string().contains("parsing routes.js"));
    assert_eq!(fx.output_listing(), listing);
    assert!(funnel.dependency_graph().unwrap().contains("utils/foo.js"));
    assert_eq!(funnel.stats().full_rebuild, 1);

    fx.rewrite("routes.js", r#"import herp from "utils/herp";"#);

    assert!(matches!(funnel.build().unwrap(), BuildOutcome::Rebuilt { .. }));
    assert_eq!(fx.output_listing(), vec!["routes.js", "utils/", "utils/herp.js"]);
}

#[test]
fn test_walker_failure_on_cold_start_writes_nothing() {
    let fx = Fixture::new(Layout::Nested);
    fx.rewrite("utils/foo.js", "import derp from");

    let mut funnel = fx.funnel(FunnelOptions::exclude("routes.js"));

    assert!(matches!(funnel.build(), Err(FunnelError::Walker(_))));
    assert!(!fx.output.exists());
    assert!(funnel.dependency_graph().is_none());
    assert_eq!(funnel.stats().builds(), 0);
}

#[test]
fn test_invalid_options_are_rejected() {
    let fx = Fixture::new(Layout::Flat);

    let both = FunnelOptions {
        include: true,
        ..FunnelOptions::exclude("routes.js")
    };
    let neither = FunnelOptions {
        exclude: false,
        ..FunnelOptions::exclude("routes.js")
    };

    for options in [both, neither, FunnelOptions::include("")] {
        let result = Funnel::from_options(&fx.input, &fx.output, options, ImportWalker);
        assert!(matches!(result, Err(FunnelError::Config(_))));
    }

    let same_root = Funnel::from_options(
        &fx.input,
        &fx.input,
        FunnelOptions::include("routes.js"),
        ImportWalker,
    );
    assert!(matches!(same_root, Err(FunnelError::Config(_))));

    let output_inside_input = Funnel::from_options(
        &fx.input,
        fx.input.join("dist"),
        FunnelOptions::include("routes.js"),
        ImportWalker,
    );
    assert!(matches!(output_inside_input, Err(FunnelError::Config(_))));
}
