use futures::future::join_all;
use seo_refinery::domain::models::{CategoryWeights, DraftReference, ScoreReport};
use seo_refinery::domain::ports::HistoryStore;
use seo_refinery::infrastructure::history::JsonlHistoryStore;
use tempfile::TempDir;
use uuid::Uuid;

fn report(iteration: u32, value: f64) -> ScoreReport {
    ScoreReport::from_category_values(
        iteration,
        &CategoryWeights::default(),
        |_| value,
        DraftReference::for_text(&format!("draft {iteration}"), 10),
    )
}

#[tokio::test]
async fn test_concurrent_runs_write_separate_files() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonlHistoryStore::new(temp_dir.path());
    let runs: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();

    join_all(runs.iter().map(|run_id| {
        let store = &store;
        async move {
            for iteration in 1..=3 {
                store
                    .append(*run_id, &report(iteration, f64::from(iteration) * 20.0))
                    .await
                    .unwrap();
            }
        }
    }))
    .await;

    for run_id in &runs {
        let entries = store.load(*run_id).await.unwrap();
        let iterations: Vec<u32> = entries.iter().map(|e| e.report.iteration()).collect();
        assert_eq!(iterations, vec![1, 2, 3]);
        assert!(entries.windows(2).all(|w| w[0].recorded_at <= w[1].recorded_at));
    }
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), runs.len());
}

#[tokio::test]
async fn test_reloaded_report_recomputes_total() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonlHistoryStore::new(temp_dir.path());
    let run_id = Uuid::new_v4();
    let written = report(1, 62.5);

    store.append(run_id, &written).await.unwrap();
    let loaded = store.load(run_id).await.unwrap();

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].report, written);
    assert!((loaded[0].report.total_score() - written.total_score()).abs() < 1e-12);
}
