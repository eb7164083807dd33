use block_ingest::file::LocalFilesystem;
use block_ingest::transform::{ColumnSum, Passthrough};
use block_ingest::{run_file, Pipeline, PipelineError, RunArgs, Stage};
use std::path::Path;
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("block_ingest=debug")
        .try_init();
}

fn write_input(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("vector_data.csv");
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_vector_sums_end_to_end() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "1,2\n2,3\n1,3");
    let output = temp_dir.path().join("vector_stats_out");

    let report = run_file(&input, &output, 2, &ColumnSum::new())
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&output).unwrap(), "4,8");
    assert_eq!(report.input_length, 11);
    assert_eq!(report.blocks_read, 6);
    assert_eq!(report.bytes_written, 3);
}

#[tokio::test]
async fn test_block_size_does_not_change_output() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let rows: Vec<String> = (0..200).map(|i| format!("{i},{},{}", i * 2, -i)).collect();
    let input = write_input(temp_dir.path(), &rows.join("\n"));

    let mut outputs = Vec::new();
    for block_size in [1, 3, 64, 1 << 20] {
        let output = temp_dir.path().join(format!("out_{block_size}"));
        run_file(&input, &output, block_size, &ColumnSum::new())
            .await
            .unwrap();
        outputs.push(std::fs::read_to_string(&output).unwrap());
    }

    assert_eq!(outputs[0], "19900,39800,-19900");
    assert!(outputs.iter().all(|o| o == &outputs[0]));
}

#[tokio::test]
async fn test_rerun_overwrites_with_identical_output() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "5,7");
    let output = temp_dir.path().join("vector_stats_out");
    std::fs::write(&output, "left over from something else entirely").unwrap();

    run_file(&input, &output, 4, &ColumnSum::new()).await.unwrap();
    let first = std::fs::read(&output).unwrap();
    run_file(&input, &output, 4, &ColumnSum::new()).await.unwrap();
    let second = std::fs::read(&output).unwrap();

    assert_eq!(first, b"5,7");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_passthrough_copies_binary_file() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("blob.bin");
    let content: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    std::fs::write(&input, &content).unwrap();
    let output = temp_dir.path().join("copies/blob.bin");

    let report = Pipeline::new(LocalFilesystem::new())
        .with_block_size(333)
        .run(&input, &output, &Passthrough)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&output).unwrap(), content);
    assert_eq!(report.blocks_read, 31);
}

#[tokio::test]
async fn test_missing_input_leaves_output_untouched() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("does_not_exist.csv");
    let output = temp_dir.path().join("vector_stats_out");
    std::fs::write(&output, "previous").unwrap();

    let err = run_file(&input, &output, 2, &ColumnSum::new())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Length));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous");
}

#[tokio::test]
async fn test_bad_input_leaves_output_untouched() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "1,2\n3\n");
    let output = temp_dir.path().join("vector_stats_out");

    let err = run_file(&input, &output, 2, &ColumnSum::new())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Transform));
    assert!(matches!(err, PipelineError::TransformFailed { .. }));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_run_from_config_file() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "1;2\n3;4\n");
    let output = temp_dir.path().join("sums");
    let config_path = temp_dir.path().join("run.yaml");
    std::fs::write(
        &config_path,
        format!(
            "input: {}\noutput: {}\nblock_size: 3\ndelimiter: \";\"\n",
            input.display(),
            output.display()
        ),
    )
    .unwrap();

    let args = RunArgs {
        config: Some(config_path),
        ..RunArgs::default()
    };
    let config = args.resolve().unwrap();
    let transform = config.build_transform().unwrap();

    run_file(&config.input, &config.output, config.block_size, transform.as_ref())
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&output).unwrap(), "4;6");
}
