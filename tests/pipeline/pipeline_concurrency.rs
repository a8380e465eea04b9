use harmonia::Pipeline;
use std::time::Duration;

#[derive(Debug, Default)]
struct Request {
    id: u32,
    trail: Vec<String>,
}

fn pipeline() -> Pipeline<Request, u32> {
    Pipeline::<Request, u32>::builder()
        .name("concurrent")
        .handler_fn(|ctx, next| {
            Box::pin(async move {
                ctx.trail.push(format!("in:{}", ctx.id));
                // Later ids sleep less, so the runs overlap and finish out of order
                tokio::time::sleep(Duration::from_millis(u64::from(20 - ctx.id))).await;
                next.run(ctx).await?;
                ctx.trail.push(format!("out:{}", ctx.id));
                Ok(None)
            })
        })
        .terminal_fn(|ctx| {
            Box::pin(async move {
                tokio::task::yield_now().await;
                ctx.trail.push(format!("handle:{}", ctx.id));
                Ok(Some(ctx.id * 100))
            })
        })
        .build()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_runs_do_not_share_state() {
    let pipeline = pipeline();

    let tasks: Vec<_> = (1..=10)
        .map(|id| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                let mut request = Request {
                    id,
                    ..Request::default()
                };
                let result = pipeline.run(&mut request).await;
                (request, result)
            })
        })
        .collect();

    for task in tasks {
        let (request, result) = task.await.expect("task panicked");
        let id = request.id;
        assert_eq!(result.unwrap(), Some(id * 100));
        assert_eq!(
            request.trail,
            vec![
                format!("in:{id}"),
                format!("handle:{id}"),
                format!("out:{id}")
            ]
        );
    }
}

#[tokio::test]
async fn interleaved_runs_on_one_task() {
    let pipeline = pipeline();
    let mut first = Request {
        id: 1,
        ..Request::default()
    };
    let mut second = Request {
        id: 2,
        ..Request::default()
    };

    let (a, b) = tokio::join!(pipeline.run(&mut first), pipeline.run(&mut second));

    assert_eq!(a.unwrap(), Some(100));
    assert_eq!(b.unwrap(), Some(200));
    assert_eq!(first.trail, vec!["in:1", "handle:1", "out:1"]);
    assert_eq!(second.trail, vec!["in:2", "handle:2", "out:2"]);
}
