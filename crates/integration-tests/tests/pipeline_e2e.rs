//! Pipeline end-to-end tests over real Parquet files

mod common;

use common::{in_range_shard, read, uniform_reference, values, Workspace, COLUMN};
use shardform_core::application::TransformShardRequest;
use shardform_core::domain::quantile::within_round_trip_tolerance;
use shardform_core::domain::{ArtifactDirection, RowBatch};
use shardform_core::error::ErrorKind;
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::task::JoinSet;

fn request(path: impl Into<PathBuf>) -> TransformShardRequest {
    TransformShardRequest {
        file_path: path.into(),
    }
}

/// 1000-row uniform reference, 50-row shard, limit 20
#[tokio::test]
async fn test_reference_scenario_round_trip() {
    let ws = Workspace::new(uniform_reference(1000, 7));
    let shard = in_range_shard(50, 11);
    let shard_path = ws.shard("Amount_Shard_1.parquet", &shard);

    let outcome = ws.pipeline(20).run(request(&shard_path)).await.unwrap();

    assert_eq!(outcome.rows_transformed, 20);
    assert!(outcome.total_time_taken().ends_with(" seconds"));

    let transformed = read(&outcome.transformed_file_path);
    let inverse = read(&outcome.inverse_transformed_file_path);
    assert_eq!(transformed.num_rows(), 20);
    assert_eq!(inverse.num_rows(), 20);
    assert_eq!(transformed.column_names(), vec![COLUMN]);

    let input = values(&shard);
    for (i, (x, y)) in input.iter().zip(values(&inverse)).enumerate() {
        assert!(
            within_round_trip_tolerance(*x, y),
            "row {}: expected {}, got {}",
            i,
            x,
            y
        );
    }
}

#[tokio::test]
async fn test_artifacts_live_under_job_directory() {
    let ws = Workspace::new(uniform_reference(200, 1));
    let shard_path = ws.shard("s.parquet", &in_range_shard(5, 2));

    let outcome = ws.pipeline(100).run(request(&shard_path)).await.unwrap();

    let root = ws.data_dir.join(&outcome.job_id);
    assert_eq!(
        outcome.transformed_file_path,
        root.join(ArtifactDirection::Transformed.file_name())
    );
    assert_eq!(
        outcome.inverse_transformed_file_path,
        root.join(ArtifactDirection::InverseTransformed.file_name())
    );

    // Only the two artifacts, no leftover temp files
    let mut names: Vec<_> = std::fs::read_dir(&root)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["inverse_transformed.parquet", "transformed.parquet"]);
}

#[tokio::test]
async fn test_truncation_keeps_leading_rows_in_order() {
    let ws = Workspace::new(uniform_reference(1000, 3));
    let shard = RowBatch::single(COLUMN, (0..40).map(|i| 200.0 + i as f64 * 200.0).collect());
    let shard_path = ws.shard("ordered.parquet", &shard);

    let outcome = ws.pipeline(15).run(request(&shard_path)).await.unwrap();
    assert_eq!(outcome.rows_transformed, 15);

    let transformed = values(&read(&outcome.transformed_file_path));
    assert!(transformed.windows(2).all(|w| w[0] <= w[1]));

    let inverse = values(&read(&outcome.inverse_transformed_file_path));
    for (x, y) in values(&shard).iter().take(15).zip(inverse) {
        assert!(within_round_trip_tolerance(*x, y), "{} vs {}", x, y);
    }
}

#[tokio::test]
async fn test_zero_variance_reference() {
    let ws = Workspace::new(RowBatch::single(COLUMN, vec![0.0; 100]));
    let shard_path = ws.shard("zeros.parquet", &RowBatch::single(COLUMN, vec![-5.0, 0.0, 3.0]));

    let outcome = ws.pipeline(10).run(request(&shard_path)).await.unwrap();

    let transformed = values(&read(&outcome.transformed_file_path));
    assert!(transformed.iter().all(|v| v.is_finite()));
    let inverse = values(&read(&outcome.inverse_transformed_file_path));
    assert!(inverse.iter().all(|v| *v == 0.0));
}

#[tokio::test]
async fn test_missing_shard_is_not_found() {
    let ws = Workspace::new(uniform_reference(100, 4));

    let err = ws
        .pipeline(10)
        .run(request(ws.dir.path().join("absent.parquet")))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!ws.data_dir.exists());
}

#[tokio::test]
async fn test_corrupt_shard_is_shard_read_error() {
    let ws = Workspace::new(uniform_reference(100, 5));
    let path = ws.dir.path().join("corrupt.parquet");
    std::fs::write(&path, b"PAR1 not really").unwrap();

    let err = ws.pipeline(10).run(request(&path)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShardRead);
    assert!(err.job_id().is_some());
}

#[tokio::test]
async fn test_text_column_is_transform_error() {
    let ws = Workspace::new(uniform_reference(100, 6));
    let path = ws.dir.path().join("labels.csv");
    std::fs::write(&path, "Amount\nlow\nhigh\n").unwrap();

    let err = ws.pipeline(10).run(request(&path)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transform);
}

#[tokio::test]
async fn test_csv_shard_is_accepted() {
    let ws = Workspace::new(uniform_reference(500, 8));
    let path = ws.dir.path().join("Amount_Shard_1.csv");
    std::fs::write(&path, "Amount\n149.62\n2.69\n378.66\n").unwrap();

    let outcome = ws.pipeline(10).run(request(&path)).await.unwrap();
    assert_eq!(outcome.rows_transformed, 3);
}

#[tokio::test]
async fn test_unreadable_reference_fails_at_fit() {
    let ws = Workspace::new(uniform_reference(100, 9));
    let shard_path = ws.shard("s.parquet", &in_range_shard(5, 9));
    std::fs::remove_file(&ws.reference).unwrap();

    let err = ws.pipeline(10).run(request(&shard_path)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fit);
    assert!(err.to_string().contains("[fit]"));
}

#[tokio::test]
async fn test_concurrent_jobs_are_isolated_and_deterministic() {
    let ws = Workspace::new(uniform_reference(1000, 10));
    let shard_path = ws.shard("shared.parquet", &in_range_shard(30, 12));
    let pipeline = ws.pipeline(30);

    let mut set = JoinSet::new();
    for _ in 0..8 {
        let pipeline = pipeline.clone();
        let path = shard_path.clone();
        set.spawn(async move { pipeline.run(request(path)).await });
    }

    let mut job_ids = HashSet::new();
    let mut outputs = Vec::new();
    while let Some(joined) = set.join_next().await {
        let outcome = joined.unwrap().unwrap();
        assert!(outcome.transformed_file_path.starts_with(ws.data_dir.join(&outcome.job_id)));
        job_ids.insert(outcome.job_id.clone());
        outputs.push(read(&outcome.transformed_file_path));
    }

    assert_eq!(job_ids.len(), 8);
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(std::fs::read_dir(&ws.data_dir).unwrap().count(), 8);
}
