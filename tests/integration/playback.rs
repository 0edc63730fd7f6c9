#![allow(missing_docs)]

use std::time::Duration;

use dinitz::{
    graph::{Capacity, EdgeStore, FlowGraph},
    playback::{
        JsonRenderer, PlaybackOptions, PlaybackOutcome, Player, RecordingRenderer, RunGate,
        StepRenderer, TextRenderer,
    },
    step::Step,
    DinitzRun, Result,
};
use serde_json::Value;

fn scenario_a() -> FlowGraph {
    let mut graph = FlowGraph::new();
    let n = graph.add_nodes(4);
    for (u, v, cap) in [(0, 1, 3.0), (0, 2, 2.0), (1, 3, 2.0), (2, 3, 3.0)] {
        graph
            .add_edge_with_capacity(n[u], n[v], Capacity::new(cap).unwrap())
            .unwrap();
    }
    graph
}

/// Cancels its flag once the given number of steps has been rendered.
struct CancelAfter {
    inner: RecordingRenderer,
    after: usize,
    flag: dinitz::playback::CancelFlag,
}

impl StepRenderer for CancelAfter {
    fn render(&mut self, step: &Step) -> Result<()> {
        self.inner.render(step)?;
        if self.inner.steps.len() == self.after {
            self.flag.cancel();
        }
        Ok(())
    }
}

#[tokio::test(flavor = "current_thread")]
async fn playback_matches_direct_iteration() {
    let mut direct_graph = scenario_a();
    let direct: Vec<Step> = DinitzRun::new(&mut direct_graph, 0, 3).collect();

    let mut graph = scenario_a();
    let mut run = DinitzRun::new(&mut graph, 0, 3);
    let mut rec = RecordingRenderer::default();
    let outcome = Player::new(PlaybackOptions::default())
        .play(&mut run, &mut rec)
        .await
        .unwrap();

    assert_eq!(rec.steps, direct);
    assert_eq!(
        outcome,
        PlaybackOutcome::Completed {
            max_flow: 4.0,
            steps: direct.len()
        }
    );
}

#[tokio::test(flavor = "current_thread")]
async fn cancel_mid_stream_keeps_written_flow() {
    let mut graph = scenario_a();
    let player = Player::new(PlaybackOptions::default());

    let mut direct_graph = scenario_a();
    let direct: Vec<Step> = DinitzRun::new(&mut direct_graph, 0, 3).collect();
    let first_update = direct
        .iter()
        .position(Step::is_flow_update)
        .expect("scenario pushes flow");

    let mut renderer = CancelAfter {
        inner: RecordingRenderer::default(),
        after: first_update + 1,
        flag: player.cancel_flag(),
    };
    let mut run = DinitzRun::new(&mut graph, 0, 3);
    let outcome = player.play(&mut run, &mut renderer).await.unwrap();

    assert_eq!(
        outcome,
        PlaybackOutcome::Cancelled {
            steps: first_update + 1
        }
    );
    assert_eq!(run.max_flow(), None);
    drop(run);
    let carried: f64 = graph.edges().map(|(_, e)| e.flow).sum();
    assert!(carried > 0.0);
}

#[tokio::test(flavor = "current_thread")]
async fn newer_run_supersedes_older_playback() {
    let gate = RunGate::new();
    let older = Player::new(PlaybackOptions::with_delay(Duration::from_millis(5)))
        .with_ticket(gate.begin());

    let mut graph = scenario_a();
    let mut run = DinitzRun::new(&mut graph, 0, 3);
    let mut rec = RecordingRenderer::default();

    let play = older.play(&mut run, &mut rec);
    let takeover = async {
        tokio::time::sleep(Duration::from_millis(12)).await;
        gate.begin()
    };
    let (outcome, newer) = tokio::join!(play, takeover);

    let outcome = outcome.unwrap();
    assert!(matches!(outcome, PlaybackOutcome::Superseded { steps } if steps > 0));
    assert!(gate.is_running());
    assert!(newer.is_current());
    newer.finish();
    assert!(!gate.is_running());
}

#[tokio::test(flavor = "current_thread")]
async fn completed_playback_releases_gate() {
    let gate = RunGate::new();
    let mut graph = scenario_a();
    let mut run = DinitzRun::new(&mut graph, 0, 3);
    let outcome = Player::new(PlaybackOptions::default())
        .with_ticket(gate.begin())
        .play(&mut run, &mut RecordingRenderer::default())
        .await
        .unwrap();
    assert!(matches!(outcome, PlaybackOutcome::Completed { .. }));
    assert!(!gate.is_running());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn delay_paces_each_step() {
    let mut graph = FlowGraph::new();
    let n = graph.add_nodes(2);
    graph.add_edge(n[0], n[1]).unwrap();
    let mut run = DinitzRun::new(&mut graph, 0, 1);

    let started = tokio::time::Instant::now();
    let outcome = Player::new(PlaybackOptions::with_delay(Duration::from_millis(100)))
        .play(&mut run, &mut RecordingRenderer::default())
        .await
        .unwrap();
    let elapsed = started.elapsed();
    let steps = u32::try_from(outcome.steps()).unwrap();
    assert!(steps > 0);
    assert!(elapsed >= Duration::from_millis(100) * steps, "{elapsed:?}");
}

#[tokio::test(flavor = "current_thread")]
async fn json_renderer_writes_one_event_per_line() {
    let mut graph = scenario_a();
    let mut run = DinitzRun::new(&mut graph, 0, 3);
    let mut renderer = JsonRenderer::new(Vec::new());
    let outcome = Player::new(PlaybackOptions::default())
        .play(&mut run, &mut renderer)
        .await
        .unwrap();

    let out = String::from_utf8(renderer.into_inner()).unwrap();
    let events: Vec<Value> = out
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), outcome.steps());
    assert_eq!(events[0]["type"], "phase");
    assert_eq!(events[0]["name"], "BFS");
    assert!(events.iter().any(|e| e["type"] == "flowUpdate"));
    assert!(events.iter().any(|e| e["type"] == "clearHighlights"));
    assert_eq!(events.last().unwrap()["message"], "Done. maxflow = 4");
}

#[tokio::test(flavor = "current_thread")]
async fn text_renderer_uses_node_names() {
    let mut graph = scenario_a();
    let mut run = DinitzRun::new(&mut graph, 0, 3);
    let names = ["A", "B", "C", "D"].map(String::from).to_vec();
    let mut renderer = TextRenderer::new(Vec::new()).with_names(names, Default::default());
    Player::new(PlaybackOptions::default())
        .play(&mut run, &mut renderer)
        .await
        .unwrap();

    let out = String::from_utf8(renderer.into_inner()).unwrap();
    assert!(out.contains("levels: A=0 B=1 C=1 D=2"), "{out}");
    assert!(out.contains("Done. maxflow = 4"), "{out}");
}
