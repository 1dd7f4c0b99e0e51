use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use sweep_core::contract::{
    LARVAL_HABITAT_PARAM, RUN_NUMBER_PARAM, SERIALIZED_POPULATION_FILENAMES_PARAM,
    SERIALIZED_POPULATION_PATH_PARAM,
};
use sweep_core::{RunType, SubmissionRequest, SweepError};
use sweep_runner::{
    export_manifest_json, export_sweep_csv, run_pipeline, ExperimentService,
    LocalExperimentService, PipelineOptions, RunnerError, ServiceError,
};

fn write_inputs(dir: &Path, extra: Value) {
    let mut instructions = json!({
        "version_name": "20191008_replicate_megatrends",
        "site_fname": "site_details.csv",
        "burnin_years": 10,
        "intervention_years": 3,
        "burnin_id": "burnin-abc"
    });
    if let (Some(base), Some(extra)) = (instructions.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    fs::write(dir.join("input_params.json"), instructions.to_string()).expect("write instructions");
    fs::write(dir.join("site_details.csv"), "name,lat,lon\nsite_a,0.0,0.0\n").expect("write sites");
    fs::write(
        dir.join("interventions.csv"),
        "int_id,start_day,cov,int\n1,10,0.5,bednet\n2,10,0.5,bednet\n2,365,0.8,irs\n",
    )
    .expect("write interventions");
}

fn write_burnin(service: &LocalExperimentService, experiment_id: &str, count: usize) {
    let records: Vec<Value> = (0..count)
        .map(|index| {
            json!({
                "tags": {
                    "Run_Number": index,
                    "x_Temporary_Larval_Habitat": 0.1,
                    "Serialization_Time_Steps": [3650]
                },
                "output_path": format!("//sims/{index}")
            })
        })
        .collect();
    let path = service.experiment_path(experiment_id);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, Value::Array(records).to_string()).expect("write experiment");
}

fn options(input_dir: &Path, run_type: RunType) -> PipelineOptions {
    PipelineOptions {
        input_dir: input_dir.to_path_buf(),
        run_type: Some(run_type),
        ..Default::default()
    }
}

#[test]
fn burnin_dry_run_builds_full_grid_without_submitting() {
    let inputs = tempfile::tempdir().expect("tempdir");
    let store = tempfile::tempdir().expect("tempdir");
    write_inputs(inputs.path(), json!({}));
    let service = LocalExperimentService::new(store.path());

    let outcome = run_pipeline(
        &PipelineOptions {
            dry_run: true,
            ..options(inputs.path(), RunType::Burnin)
        },
        &service,
    )
    .expect("pipeline should succeed");

    assert!(outcome.receipt.is_none());
    assert_eq!(outcome.request.run_name, "MAP_20191008_replicate_megatrends_Burnin");
    assert_eq!(outcome.request.base_config.simulation_duration_days, 3650);
    assert_eq!(outcome.request.sweep.len(), 10 * 50);
    assert!(!service
        .submission_path("MAP_20191008_replicate_megatrends_Burnin")
        .exists());
}

#[test]
fn intervention_run_crosses_burnins_with_packages() {
    let inputs = tempfile::tempdir().expect("tempdir");
    let store = tempfile::tempdir().expect("tempdir");
    write_inputs(inputs.path(), json!({}));
    let service = LocalExperimentService::new(store.path());
    write_burnin(&service, "burnin-abc", 2);

    let outcome = run_pipeline(&options(inputs.path(), RunType::Intervention), &service)
        .expect("pipeline should succeed");

    let receipt = outcome.receipt.expect("submitted");
    assert_eq!(receipt.entries, 4);
    assert_eq!(receipt.fingerprint, outcome.request.fingerprint);

    let sweep = &outcome.request.sweep;
    assert_eq!(
        sweep[0].param(SERIALIZED_POPULATION_PATH_PARAM),
        Some(&json!("//sims/0/output"))
    );
    assert_eq!(
        sweep[1].param(SERIALIZED_POPULATION_PATH_PARAM),
        Some(&json!("//sims/0/output"))
    );
    assert_eq!(
        sweep[2].param(SERIALIZED_POPULATION_PATH_PARAM),
        Some(&json!("//sims/1/output"))
    );
    assert_eq!(
        sweep[3].param(SERIALIZED_POPULATION_FILENAMES_PARAM),
        Some(&json!(["state-03650.dtk"]))
    );
    assert_eq!(sweep[3].param(RUN_NUMBER_PARAM), Some(&json!(1)));
    assert_eq!(sweep[3].param(LARVAL_HABITAT_PARAM), Some(&json!(0.1)));
    assert_eq!(sweep[3].len(), 3);

    let written = fs::read_to_string(service.submission_path(&receipt.run_name))
        .expect("submission on disk");
    let stored: SubmissionRequest = serde_json::from_str(&written).expect("stored request");
    assert_eq!(stored, outcome.request);
}

#[test]
fn test_run_continues_from_first_three_burnins() {
    let inputs = tempfile::tempdir().expect("tempdir");
    let store = tempfile::tempdir().expect("tempdir");
    write_inputs(inputs.path(), json!({}));
    let service = LocalExperimentService::new(store.path());
    write_burnin(&service, "burnin-abc", 5);

    let outcome = run_pipeline(
        &PipelineOptions {
            test_run: true,
            dry_run: true,
            ..options(inputs.path(), RunType::Intervention)
        },
        &service,
    )
    .expect("pipeline should succeed");

    assert_eq!(
        outcome.request.run_name,
        "MAP_20191008_replicate_megatrends_Intervention_TEST"
    );
    assert_eq!(outcome.request.sweep.len(), 3 * 2);
}

#[test]
fn run_type_from_instructions_is_validated() {
    let inputs = tempfile::tempdir().expect("tempdir");
    let store = tempfile::tempdir().expect("tempdir");
    write_inputs(inputs.path(), json!({"run_type": "calibration"}));
    let service = LocalExperimentService::new(store.path());

    let error = run_pipeline(
        &PipelineOptions {
            input_dir: inputs.path().to_path_buf(),
            ..Default::default()
        },
        &service,
    )
    .expect_err("calibration is not a run type");

    assert!(matches!(
        error,
        RunnerError::Sweep(SweepError::Configuration(_))
    ));
}

#[test]
fn missing_burnin_experiment_stops_before_submission() {
    let inputs = tempfile::tempdir().expect("tempdir");
    let store = tempfile::tempdir().expect("tempdir");
    write_inputs(inputs.path(), json!({}));
    let service = LocalExperimentService::new(store.path());

    let error = run_pipeline(&options(inputs.path(), RunType::Intervention), &service)
        .expect_err("burn-in experiment does not exist");

    assert!(matches!(
        error,
        RunnerError::Service(ServiceError::NotFound(ref id)) if id == "burnin-abc"
    ));
    assert!(!service
        .submission_path("MAP_20191008_replicate_megatrends_Intervention")
        .exists());
}

#[test]
fn inconsistent_burnin_checkpoints_are_data_errors() {
    let inputs = tempfile::tempdir().expect("tempdir");
    let store = tempfile::tempdir().expect("tempdir");
    write_inputs(inputs.path(), json!({}));
    let service = LocalExperimentService::new(store.path());
    let path = service.experiment_path("burnin-abc");
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(
        &path,
        json!([
            {"tags": {"Run_Number": 0, "x_Temporary_Larval_Habitat": 1.0, "Serialization_Time_Steps": [3650]}, "output_path": "A"},
            {"tags": {"Run_Number": 1, "x_Temporary_Larval_Habitat": 1.0, "Serialization_Time_Steps": [1825]}, "output_path": "B"}
        ])
        .to_string(),
    )
    .expect("write experiment");

    let error = run_pipeline(&options(inputs.path(), RunType::Intervention), &service)
        .expect_err("checkpoint steps disagree");

    assert!(matches!(
        error,
        RunnerError::Sweep(SweepError::Data { ref record, .. }) if record == "B"
    ));
}

#[test]
fn burnin_record_without_output_path_is_data_error() {
    let inputs = tempfile::tempdir().expect("tempdir");
    let store = tempfile::tempdir().expect("tempdir");
    write_inputs(inputs.path(), json!({}));
    let service = LocalExperimentService::new(store.path());
    let path = service.experiment_path("burnin-abc");
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(
        &path,
        json!([
            {"tags": {"Run_Number": 0, "x_Temporary_Larval_Habitat": 1.0, "Serialization_Time_Steps": [3650]}, "output_path": "A"},
            {"tags": {"Run_Number": 7, "x_Temporary_Larval_Habitat": 1.0, "Serialization_Time_Steps": [3650]}}
        ])
        .to_string(),
    )
    .expect("write experiment");

    let error = run_pipeline(&options(inputs.path(), RunType::Intervention), &service)
        .expect_err("second record has no output path");

    assert!(matches!(
        error,
        RunnerError::Sweep(SweepError::Data { ref record, .. }) if record == "run 7"
    ));
    assert!(!service
        .submission_path("MAP_20191008_replicate_megatrends_Intervention")
        .exists());
}

#[test]
fn exports_manifest_and_csv() {
    let inputs = tempfile::tempdir().expect("tempdir");
    let store = tempfile::tempdir().expect("tempdir");
    let out = tempfile::tempdir().expect("tempdir");
    write_inputs(inputs.path(), json!({}));
    let service = LocalExperimentService::new(store.path());
    write_burnin(&service, "burnin-abc", 1);

    let outcome = run_pipeline(
        &PipelineOptions {
            dry_run: true,
            ..options(inputs.path(), RunType::Intervention)
        },
        &service,
    )
    .expect("pipeline should succeed");

    let manifest = out.path().join("manifest.json");
    export_manifest_json(&outcome.request, &manifest).expect("manifest");
    let parsed: SubmissionRequest =
        serde_json::from_str(&fs::read_to_string(&manifest).expect("read")).expect("parse");
    assert_eq!(parsed.fingerprint, outcome.request.fingerprint);

    let csv_path = out.path().join("nested").join("sweep.csv");
    export_sweep_csv(&outcome.request, &csv_path).expect("csv");
    let text = fs::read_to_string(&csv_path).expect("read csv");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("run_index,unit_index,kind,name,value"));
    // Two runs, each with four continuation parameters; run 1 adds two campaigns.
    assert_eq!(lines.clone().count(), 4 + 1 + 4 + 2);
    assert!(text.contains("campaign,irs"));
}

#[test]
fn local_service_is_usable_through_the_trait() {
    let store = tempfile::tempdir().expect("tempdir");
    let service = LocalExperimentService::new(store.path());
    write_burnin(&service, "burnin-abc", 2);

    let dynamic: &dyn ExperimentService = &service;
    let records = dynamic.retrieve_experiment("burnin-abc").expect("records");
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].output_path, "//sims/1");
}
