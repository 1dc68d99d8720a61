#[cfg(test)]
mod tests {
    use crate::{
        doubles::{InsertFailure, MemoryDestination},
        utils::{
            RecordStream, failing_stream_of, siren, source_record, source_records, stream_of, write_csv,
            write_raw_csv,
        },
    };
    use connectors::file::csv::{error::FileError, settings::CsvSettings, source::CsvSource};
    use engine_config::{report::summary::TransferReport, settings::import::ImportSettings};
    use engine_core::{
        controller::{TransferController, TransferSettings},
        error::TransferError,
        loader::BulkLoader,
        mapper::{RowMapper, UNITE_LEGALE_COLUMNS},
        retry::RetryPolicy,
    };
    use model::{
        core::value::Value,
        records::batch::Batch,
        transfer::{LoadResult, TransferOutcome},
    };
    use std::{num::NonZeroUsize, sync::Arc, time::Duration};
    use tokio_util::sync::CancellationToken;
    use tracing_test::traced_test;

    fn controller(destination: &MemoryDestination, batch_size: usize) -> TransferController {
        TransferController::new(
            Arc::new(destination.clone()),
            TransferSettings {
                batch_size: NonZeroUsize::new(batch_size).unwrap(),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_duplicate_key_is_skipped_across_batches() {
        let destination = MemoryDestination::new();
        let mut records = source_records(0, 2499);
        // Last record repeats the first key.
        records.push(source_record(&siren(0), "DUPLICATE"));

        let outcome = controller(&destination, 1000)
            .run(stream_of(records))
            .await
            .unwrap();

        assert_eq!(destination.insert_sizes(), vec![1000, 1000, 500]);
        assert_eq!(
            outcome,
            TransferOutcome {
                records_read: 2500,
                records_persisted: 2499,
                records_skipped: 1,
                batches_loaded: 3,
            }
        );
        assert_eq!(destination.row_count(), 2499);
        // First writer wins.
        assert_eq!(
            destination.row(&siren(0)).unwrap()["denomination_unite_legale"],
            Value::String("COMPANY 0".into())
        );
        assert_eq!(destination.lock().commits, 1);
    }

    #[tokio::test]
    async fn test_failed_batch_rolls_back_the_whole_run() {
        let destination = MemoryDestination::new().failing(InsertFailure {
            on_insert: 2,
            transient: false,
            times: 1,
        });

        let err = controller(&destination, 1000)
            .run(stream_of(source_records(0, 2500)))
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::BatchRejected { seq: 2, .. }));
        assert_eq!(destination.row_count(), 0);
        let state = destination.lock();
        assert_eq!(state.insert_sizes, vec![1000, 1000]);
        assert_eq!(state.rollbacks, 1);
        assert_eq!(state.commits, 0);
    }

    #[tokio::test]
    async fn test_rerun_persists_nothing_new() {
        let destination = MemoryDestination::new();

        let first = controller(&destination, 40)
            .run(stream_of(source_records(0, 100)))
            .await
            .unwrap();
        let second = controller(&destination, 40)
            .run(stream_of(source_records(0, 100)))
            .await
            .unwrap();

        assert_eq!(first.records_persisted, 100);
        assert_eq!(second.records_persisted, 0);
        assert_eq!(second.records_skipped, 100);
        assert_eq!(second.batches_loaded, 3);
        assert_eq!(destination.row_count(), 100);
    }

    #[tokio::test]
    async fn test_same_batch_twice_in_one_session() {
        use engine_core::connectors::destination::Destination;

        let destination = MemoryDestination::new();
        let mapper = RowMapper::unite_legale();
        let rows = source_records(0, 10).iter().map(|r| mapper.map(r)).collect();
        let batch = Batch::new(1, rows).unwrap();
        let loader = BulkLoader::new("unite_legale");

        let mut session = destination.begin().await.unwrap();
        let first = loader.load(session.as_mut(), &batch).await.unwrap();
        let second = loader.load(session.as_mut(), &batch).await.unwrap();
        session.commit().await.unwrap();

        assert_eq!(first, LoadResult { persisted: 10, skipped: 0 });
        assert_eq!(second, LoadResult { persisted: 0, skipped: 10 });
        assert_eq!(destination.row_count(), 10);
    }

    #[tokio::test]
    async fn test_custom_translation_table() {
        static REDUCED: [(&str, &str); 2] = [
            ("siren", "siren"),
            ("denominationUniteLegale", "denomination_unite_legale"),
        ];
        let destination = MemoryDestination::new();

        controller(&destination, 10)
            .with_mapper(RowMapper::new(&REDUCED))
            .run(stream_of(source_records(0, 3)))
            .await
            .unwrap();

        let row = destination.row(&siren(2)).unwrap();
        assert_eq!(row.len(), 2);
        assert_eq!(
            row["denomination_unite_legale"],
            Value::String("COMPANY 2".into())
        );
    }

    #[tokio::test]
    async fn test_exact_multiple_has_no_trailing_batch() {
        let destination = MemoryDestination::new();
        let outcome = controller(&destination, 25)
            .run(stream_of(source_records(0, 100)))
            .await
            .unwrap();

        assert_eq!(destination.insert_sizes(), vec![25; 4]);
        assert_eq!(outcome.batches_loaded, 4);
    }

    #[tokio::test]
    async fn test_empty_source_commits_nothing() {
        let destination = MemoryDestination::new();
        let outcome = controller(&destination, 10)
            .run(stream_of(Vec::new()))
            .await
            .unwrap();

        assert_eq!(outcome, TransferOutcome::default());
        assert!(destination.insert_sizes().is_empty());
        assert_eq!(destination.lock().commits, 1);
    }

    #[tokio::test]
    async fn test_unavailable_source_never_touches_the_store() {
        let destination = MemoryDestination::new();
        destination.seed("000000001");
        let controller = TransferController::new(
            Arc::new(destination.clone()),
            TransferSettings {
                clear_first: true,
                ..Default::default()
            },
        );

        let err = controller
            .run(|| -> Result<RecordStream, FileError> {
                Err(FileError::NotFound("missing.csv".into()))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::SourceUnavailable(_)));
        let state = destination.lock();
        assert_eq!(state.truncations, 0);
        assert_eq!(state.sessions, 0);
        assert_eq!(state.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_store_fails_without_loading() {
        let destination = MemoryDestination::new().unreachable();

        let err = controller(&destination, 10)
            .run(stream_of(source_records(0, 25)))
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::StoreUnavailable(_)));
        let state = destination.lock();
        assert_eq!(state.sessions, 0);
        assert!(state.insert_sizes.is_empty());
        assert!(state.rows.is_empty());
    }

    #[tokio::test]
    async fn test_failed_clear_is_fatal_and_never_begins() {
        let destination = MemoryDestination::new().refusing_truncate();
        destination.seed("999999999");
        let controller = TransferController::new(
            Arc::new(destination.clone()),
            TransferSettings {
                clear_first: true,
                ..Default::default()
            },
        );

        let err = controller
            .run(stream_of(source_records(0, 5)))
            .await
            .unwrap_err();

        match err {
            TransferError::ClearFailed { table, .. } => assert_eq!(table, "unite_legale"),
            other => panic!("unexpected error: {other}"),
        }
        let state = destination.lock();
        assert_eq!(state.sessions, 0);
        assert_eq!(state.truncations, 0);
        assert!(state.insert_sizes.is_empty());
        assert_eq!(state.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_source_error_mid_stream_rolls_back() {
        let destination = MemoryDestination::new();

        let err = controller(&destination, 1000)
            .run(failing_stream_of(source_records(0, 1500)))
            .await
            .unwrap_err();

        match err {
            TransferError::SourceRead { records_read, .. } => assert_eq!(records_read, 1500),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(destination.insert_sizes(), vec![1000]);
        assert_eq!(destination.row_count(), 0);
        assert_eq!(destination.lock().rollbacks, 1);
    }

    #[tokio::test]
    async fn test_clear_first_replaces_previous_content() {
        let destination = MemoryDestination::new();
        destination.seed("999999999");

        let controller = TransferController::new(
            Arc::new(destination.clone()),
            TransferSettings {
                clear_first: true,
                ..Default::default()
            },
        );
        controller
            .run(stream_of(source_records(0, 5)))
            .await
            .unwrap();

        assert_eq!(destination.lock().truncations, 1);
        assert!(destination.row("999999999").is_none());
        assert_eq!(destination.row_count(), 5);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_record() {
        let destination = MemoryDestination::new();
        let token = CancellationToken::new();
        token.cancel();

        let err = controller(&destination, 10)
            .with_cancellation(token)
            .run(stream_of(source_records(0, 50)))
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Cancelled));
        assert_eq!(destination.row_count(), 0);
        assert!(destination.insert_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_clear_leaves_the_store_alone() {
        let destination = MemoryDestination::new();
        destination.seed("999999999");
        let token = CancellationToken::new();
        token.cancel();
        let controller = TransferController::new(
            Arc::new(destination.clone()),
            TransferSettings {
                clear_first: true,
                ..Default::default()
            },
        )
        .with_cancellation(token);

        let err = controller
            .run(stream_of(source_records(0, 5)))
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Cancelled));
        let state = destination.lock();
        assert_eq!(state.truncations, 0);
        assert_eq!(state.sessions, 0);
        assert_eq!(state.rows.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_during_a_batch() {
        let destination = MemoryDestination::new().with_insert_delay(Duration::from_secs(5));
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let err = controller(&destination, 10)
            .with_cancellation(token)
            .run(stream_of(source_records(0, 50)))
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Cancelled));
        assert_eq!(destination.row_count(), 0);
        assert_eq!(destination.lock().rollbacks, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_batch_times_out() {
        let destination = MemoryDestination::new().with_insert_delay(Duration::from_secs(5));
        let controller = TransferController::new(
            Arc::new(destination.clone()),
            TransferSettings {
                batch_timeout: Some(Duration::from_secs(1)),
                ..Default::default()
            },
        );

        let err = controller
            .run(stream_of(source_records(0, 3)))
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Timeout { seq: 1, .. }));
        assert_eq!(destination.row_count(), 0);
    }

    #[tokio::test]
    async fn test_transient_failure_reruns_the_transfer() {
        let destination = MemoryDestination::new().failing(InsertFailure {
            on_insert: 2,
            transient: true,
            times: 1,
        });
        let policy = RetryPolicy::new(3, Duration::ZERO, Duration::ZERO);

        let outcome = controller(&destination, 10)
            .run_with_retry(|| stream_of(source_records(0, 25))(), &policy)
            .await
            .unwrap();

        assert_eq!(outcome.records_persisted, 25);
        assert_eq!(destination.row_count(), 25);
        let state = destination.lock();
        assert_eq!(state.sessions, 2);
        assert_eq!(state.rollbacks, 1);
        assert_eq!(state.commits, 1);
    }

    #[tokio::test]
    async fn test_rejected_batch_is_not_retried() {
        let destination = MemoryDestination::new().failing(InsertFailure {
            on_insert: 1,
            transient: false,
            times: 5,
        });
        let policy = RetryPolicy::new(3, Duration::ZERO, Duration::ZERO);

        let err = controller(&destination, 10)
            .run_with_retry(|| stream_of(source_records(0, 25))(), &policy)
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::BatchRejected { seq: 1, .. }));
        assert_eq!(destination.lock().sessions, 1);
    }

    #[traced_test]
    #[tokio::test]
    async fn test_progress_and_summary_are_logged() {
        let destination = MemoryDestination::new();
        controller(&destination, 2)
            .run(stream_of(source_records(0, 5)))
            .await
            .unwrap();

        assert!(logs_contain("Batch loaded"));
        assert!(logs_contain("batch_id=batch-3"));
        assert!(logs_contain("Progress"));
        assert!(logs_contain("Transfer committed"));
        assert!(logs_contain("records_persisted=5"));
    }

    #[traced_test]
    #[tokio::test]
    async fn test_rollback_is_logged() {
        let destination = MemoryDestination::new().failing(InsertFailure {
            on_insert: 1,
            transient: false,
            times: 1,
        });
        let _ = controller(&destination, 2)
            .run(stream_of(source_records(0, 5)))
            .await;

        assert!(logs_contain("Transfer rolled back"));
    }

    #[tokio::test]
    async fn test_csv_file_end_to_end() {
        let file = write_csv(&[
            "005880596,,GEDIMO HOLDING,GEP,1957-01-01,70.10Z,O",
            "000325175,DUPONT,,,2000-09-26,,N",
            "005880596,,SECOND WRITER,,,,",
            "006004659",
        ]);
        let path = file.path().to_string_lossy().into_owned();
        let destination = MemoryDestination::new();

        let outcome = controller(&destination, 2)
            .run(|| CsvSource::open(&path, CsvSettings::default()))
            .await
            .unwrap();

        assert_eq!(outcome.records_read, 4);
        assert_eq!(outcome.records_persisted, 3);
        assert_eq!(outcome.records_skipped, 1);

        let gedimo = destination.row("005880596").unwrap();
        assert_eq!(gedimo.len(), UNITE_LEGALE_COLUMNS.len());
        assert_eq!(
            gedimo["denomination_unite_legale"],
            Value::String("GEDIMO HOLDING".into())
        );
        assert_eq!(gedimo["nom_unite_legale"], Value::Null);
        assert_eq!(gedimo["prenom_1_unite_legale"], Value::Null);

        // Short row: everything but the key is NULL.
        let short = destination.row("006004659").unwrap();
        assert_eq!(short["activite_principale_unite_legale"], Value::Null);
    }

    #[tokio::test]
    async fn test_csv_with_bom_semicolons_and_reordered_columns() {
        let file = write_raw_csv(
            "\u{feff}activitePrincipaleUniteLegale;siren;colonneInconnue\n62.01Z;552032534;x\n",
        );
        let path = file.path().to_string_lossy().into_owned();
        let destination = MemoryDestination::new();

        controller(&destination, 10)
            .run(|| CsvSource::open(&path, CsvSettings::new(b';')))
            .await
            .unwrap();

        let row = destination.row("552032534").unwrap();
        assert_eq!(
            row["activite_principale_unite_legale"],
            Value::String("62.01Z".into())
        );
        assert!(!row.contains_key("colonneInconnue"));
    }

    #[tokio::test]
    async fn test_report_for_a_committed_import() {
        let file = write_csv(&["005880596,,GEDIMO HOLDING,,,,"]);
        let settings = ImportSettings {
            csv_file: file.path().to_path_buf(),
            ..Default::default()
        };
        settings.validate().unwrap();
        let path = file.path().to_string_lossy().into_owned();
        let destination = MemoryDestination::new();

        let controller = TransferController::new(
            Arc::new(destination.clone()),
            settings.transfer_settings(),
        );
        let report = TransferReport::for_import(controller.run_id(), &settings);
        let outcome = controller
            .run_with_retry(
                || CsvSource::open(&path, CsvSettings::new(settings.delimiter)),
                &settings.retry_policy(),
            )
            .await
            .unwrap();
        let report = report.committed(
            outcome.records_read,
            outcome.records_persisted,
            outcome.records_skipped,
            outcome.batches_loaded,
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "committed");
        assert_eq!(json["records_persisted"], 1);
        assert_eq!(json["table"], "unite_legale");
    }
}
