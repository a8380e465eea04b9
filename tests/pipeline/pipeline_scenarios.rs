use harmonia::{handler_fn, sync_fn, Handler, Next, Pipeline, PipelineError};
use std::sync::Arc;

type Trail = Vec<String>;

fn push(ctx: &mut Trail, entry: &str) {
    ctx.push(entry.to_string());
}

#[tokio::test]
async fn handlers_before_and_after_next_interleave() {
    // a pushes 'a', awaits next, pushes 'f'; b pushes 'b' and returns 'R'
    let pipeline = Pipeline::<Trail, String>::builder()
        .handler_fn(|ctx, next| {
            Box::pin(async move {
                push(ctx, "a");
                next.run(ctx).await?;
                push(ctx, "f");
                Ok(None)
            })
        })
        .sync_fn(|ctx| {
            push(ctx, "b");
            Ok(Some("R".to_string()))
        })
        .build();

    let mut ctx = Trail::new();
    let result = pipeline.run(&mut ctx).await.unwrap();

    assert_eq!(ctx, vec!["a", "b", "f"]);
    assert_eq!(result.as_deref(), Some("R"));
}

#[tokio::test]
async fn downstream_error_reaches_caller_unchanged() {
    let pipeline = Pipeline::<Trail, String>::builder()
        .handler_fn(|ctx, next| {
            Box::pin(async move {
                push(ctx, "before");
                next.run(ctx).await?;
                push(ctx, "after");
                Ok(None)
            })
        })
        .sync_fn(|_| Err(PipelineError::handler(anyhow::anyhow!("boom"))))
        .build();

    let mut ctx = Trail::new();
    let err = pipeline.run(&mut ctx).await.unwrap_err();

    assert_eq!(err.to_string(), "boom");
    assert!(!err.is_construction());
    assert_eq!(ctx, vec!["before"]);
}

#[tokio::test]
async fn only_first_handler_runs_when_nobody_calls_next() {
    let pipeline = Pipeline::<Trail, String>::builder()
        .sync_fn(|ctx| {
            push(ctx, "1");
            Ok(Some("first".to_string()))
        })
        .sync_fn(|ctx| {
            push(ctx, "2");
            Ok(Some("second".to_string()))
        })
        .sync_fn(|ctx| {
            push(ctx, "3");
            Ok(Some("third".to_string()))
        })
        .build();

    let mut ctx = Trail::new();
    let result = pipeline.run(&mut ctx).await.unwrap();

    assert_eq!(ctx, vec!["1"]);
    assert_eq!(result.as_deref(), Some("first"));
}

#[tokio::test]
async fn nested_pipeline_continues_into_the_outer_one() {
    fn step(tag: &'static str) -> Arc<dyn Handler<Trail, String>> {
        Arc::new(handler_fn::<Trail, String, _>(move |ctx, next| {
            Box::pin(async move {
                ctx.push(format!("{tag}>"));
                next.run(ctx).await?;
                ctx.push(format!("<{tag}"));
                Ok(None)
            })
        }))
    }

    let auth = Pipeline::new(vec![step("auth"), step("audit")]).with_name("auth");
    let api = Pipeline::<Trail, String>::builder()
        .name("api")
        .handler(step("log"))
        .pipeline(auth)
        .handler(Arc::new(sync_fn(|ctx: &mut Trail| {
            push(ctx, "respond");
            Ok(Some("200".to_string()))
        })))
        .build();

    let mut ctx = Trail::new();
    let result = api.run(&mut ctx).await.unwrap();

    assert_eq!(result.as_deref(), Some("200"));
    assert_eq!(
        ctx,
        vec!["log>", "auth>", "audit>", "respond", "<audit", "<auth", "<log"]
    );
}

#[tokio::test]
async fn nested_double_next_is_scoped_to_inner_invocation() {
    let inner = Pipeline::<Trail, String>::builder()
        .name("inner")
        .handler_fn(|ctx, next| {
            Box::pin(async move {
                next.run(ctx).await?;
                next.run(ctx).await?;
                Ok(None)
            })
        })
        .build();
    let outer = Pipeline::<Trail, String>::builder()
        .pipeline(inner)
        .sync_fn(|ctx| {
            push(ctx, "tail");
            Ok(None)
        })
        .build();

    let mut ctx = Trail::new();
    let err = outer.run(&mut ctx).await.unwrap_err();

    // The inner pipeline's own continuation was run twice
    assert!(matches!(err, PipelineError::DoubleNext { position: 1 }));
    assert_eq!(ctx, vec!["tail"]);
}

#[tokio::test]
async fn run_with_uses_supplied_outer_continuation() {
    let inner = Pipeline::<Trail, String>::builder()
        .handler_fn(|ctx, next| {
            Box::pin(async move {
                push(ctx, "inner");
                next.run(ctx).await?;
                Ok(None)
            })
        })
        .build();

    let mut ctx = Trail::new();
    let end = Next::end();
    let result = inner.run_with(&mut ctx, Some(&end)).await.unwrap();

    assert_eq!(result, None);
    assert_eq!(ctx, vec!["inner"]);
}

#[tokio::test]
async fn single_failing_handler_fails_the_run() {
    let pipeline = Pipeline::<Trail, String>::builder()
        .sync_fn(|_| Err("boom".into()))
        .build();

    let mut ctx = Trail::new();
    let err = pipeline.run(&mut ctx).await.unwrap_err();

    assert_eq!(err.to_string(), "boom");
    assert!(err.handler_error().is_some());
    assert!(ctx.is_empty());
}
