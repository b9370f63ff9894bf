//! Integration tests for ops crate

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use tsdist_config::{Config, DefinitionEntry};
    use tsdist_errors::{Error, OpsError, PlatformError};
    use tsdist_events::{AppEvent, EventMessage, EventReceiver, GeneralEvent, TypingsEvent};
    use tsdist_ops::*;
    use tsdist_platform::{
        CommandOutput, FilesystemOperations, Platform, PlatformCommand, PlatformContext,
        ProcessOperations,
    };

    /// Records every command and answers with a scripted exit code
    #[derive(Clone, Default)]
    struct RecordingProcess {
        calls: Arc<Mutex<Vec<PlatformCommand>>>,
        /// Commands whose display contains this string exit with status 2
        fail_on: Option<String>,
        missing_program: Option<String>,
    }

    #[async_trait]
    impl ProcessOperations for RecordingProcess {
        async fn execute_command(
            &self,
            _ctx: &PlatformContext,
            cmd: PlatformCommand,
        ) -> Result<CommandOutput, Error> {
            if self.missing_program.as_deref() == Some(cmd.program()) {
                return Err(PlatformError::CommandNotFound {
                    command: cmd.program().to_string(),
                }
                .into());
            }
            let failing = self
                .fail_on
                .as_ref()
                .is_some_and(|needle| cmd.to_string().contains(needle.as_str()));
            self.calls.lock().unwrap().push(cmd);
            Ok(CommandOutput {
                exit_code: Some(if failing { 2 } else { 0 }),
                stderr: if failing {
                    b"error TS2307: Cannot find module 'matrix'\n".to_vec()
                } else {
                    Vec::new()
                },
                ..CommandOutput::default()
            })
        }

        async fn which(&self, program: &str) -> Result<PathBuf, Error> {
            if self.missing_program.as_deref() == Some(program) {
                Err(PlatformError::CommandNotFound {
                    command: program.to_string(),
                }
                .into())
            } else {
                Ok(PathBuf::from("/usr/bin").join(program))
            }
        }
    }

    /// In-memory directory set, `links` maps a path to what it resolves to
    #[derive(Clone, Default)]
    struct FakeFilesystem {
        dirs: Arc<Mutex<HashSet<PathBuf>>>,
        links: Arc<Mutex<HashMap<PathBuf, PathBuf>>>,
        removed: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl FakeFilesystem {
        fn with_dirs(dirs: &[&str]) -> Self {
            let fs = Self::default();
            fs.dirs
                .lock()
                .unwrap()
                .extend(dirs.iter().map(PathBuf::from));
            fs
        }
    }

    #[async_trait]
    impl FilesystemOperations for FakeFilesystem {
        async fn is_dir(&self, _ctx: &PlatformContext, path: &Path) -> bool {
            self.dirs.lock().unwrap().contains(path)
        }

        async fn canonicalize(
            &self,
            _ctx: &PlatformContext,
            path: &Path,
        ) -> Result<PathBuf, PlatformError> {
            let links = self.links.lock().unwrap();
            Ok(links.get(path).cloned().unwrap_or_else(|| path.to_path_buf()))
        }

        async fn remove_dir_all(
            &self,
            _ctx: &PlatformContext,
            path: &Path,
        ) -> Result<bool, PlatformError> {
            self.removed.lock().unwrap().push(path.to_path_buf());
            Ok(self.dirs.lock().unwrap().remove(path))
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.project.root = PathBuf::from("/work/app");
        config.typings.packages_dir = PathBuf::from("/work/packages");
        config
    }

    fn build_ctx(
        config: Config,
        process: &RecordingProcess,
        fs: &FakeFilesystem,
        check_mode: bool,
    ) -> (OpsCtx, EventReceiver) {
        let (tx, rx) = tsdist_events::channel();
        let platform = Platform::new(Box::new(fs.clone()), Box::new(process.clone()));
        let ctx = OpsContextBuilder::new()
            .with_platform(platform)
            .with_event_sender(tx)
            .with_config(config)
            .with_check_mode(check_mode)
            .build()
            .unwrap();
        (ctx, rx)
    }

    fn drain(rx: &mut EventReceiver) -> Vec<EventMessage> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn progress_lines(events: &[EventMessage]) -> Vec<String> {
        events
            .iter()
            .filter_map(|m| match &m.event {
                AppEvent::General(GeneralEvent::Progress { message }) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn recorded(process: &RecordingProcess) -> Vec<(String, Vec<String>)> {
        process
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| (c.program().to_string(), c.get_args().to_vec()))
            .collect()
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_typings_installs_each_entry_once_in_order() {
        let process = RecordingProcess::default();
        let fs = FakeFilesystem::default();
        let (ctx, mut rx) = build_ctx(test_config(), &process, &fs, false);

        let report = install_typings(&ctx).await.unwrap();

        assert_eq!(
            recorded(&process),
            vec![
                (
                    "typings".to_string(),
                    args(&["install", "file:/work/packages/matrix/dist/matrix.d.ts"])
                ),
                (
                    "typings".to_string(),
                    args(&["install", "file:/work/packages/matrix2/dist/matrix2.d.ts"])
                ),
            ]
        );
        assert!(report.success());
        assert_eq!(report.steps.len(), 2);
        assert!(report
            .steps
            .iter()
            .all(|s| s.outcome == StepOutcome::Succeeded));

        let calls = process.calls.lock().unwrap();
        assert!(calls
            .iter()
            .all(|c| c.get_current_dir() == Some(&PathBuf::from("/work/app"))));
        drop(calls);

        let events = drain(&mut rx);
        assert_eq!(
            progress_lines(&events),
            vec!["Installing type definition files..."]
        );
        assert!(events.iter().any(|m| matches!(
            m.event,
            AppEvent::Typings(TypingsEvent::Completed {
                installed: 2,
                failed: 0
            })
        )));
    }

    #[tokio::test]
    async fn test_global_flag_only_for_global_entries() {
        let mut config = test_config();
        config.typings.definitions = vec![
            DefinitionEntry {
                name: "node".to_string(),
                source: Some("dt~node".to_string()),
                global: true,
            },
            DefinitionEntry {
                name: "matrix".to_string(),
                source: None,
                global: false,
            },
        ];
        let process = RecordingProcess::default();
        let fs = FakeFilesystem::default();
        let (ctx, _rx) = build_ctx(config, &process, &fs, false);

        install_typings(&ctx).await.unwrap();

        let calls = recorded(&process);
        assert_eq!(calls[0].1, args(&["install", "dt~node", "--global"]));
        assert_eq!(
            calls[1].1,
            args(&["install", "file:/work/packages/matrix/dist/matrix.d.ts"])
        );
    }

    #[tokio::test]
    async fn test_empty_table_runs_nothing() {
        let mut config = test_config();
        config.typings.definitions.clear();
        let process = RecordingProcess::default();
        let fs = FakeFilesystem::default();
        let (ctx, _rx) = build_ctx(config, &process, &fs, false);

        let report = install_typings(&ctx).await.unwrap();
        assert!(report.steps.is_empty());
        assert!(recorded(&process).is_empty());
    }

    #[tokio::test]
    async fn test_dist_installs_typings_when_directory_missing() {
        let process = RecordingProcess::default();
        let fs = FakeFilesystem::with_dirs(&["/work/app/dist"]);
        let (ctx, mut rx) = build_ctx(test_config(), &process, &fs, false);

        let report = build_dist(&ctx, DistOptions::default()).await.unwrap();

        let calls = recorded(&process);
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].0, "typings");
        assert_eq!(calls[1].0, "typings");
        assert_eq!(calls[2], ("tsc".to_string(), args(&["--declaration"])));

        assert!(report.typings.is_some());
        assert!(report.removed_output);
        assert!(report.success());
        assert_eq!(
            fs.removed.lock().unwrap().as_slice(),
            [PathBuf::from("/work/app/dist")]
        );

        assert_eq!(
            progress_lines(&drain(&mut rx)),
            vec![
                "Install type definition files...",
                "Installing type definition files...",
                "Updates JavaScript and Type Definition files...",
            ]
        );
    }

    #[tokio::test]
    async fn test_dist_skips_typings_when_directory_present() {
        let process = RecordingProcess::default();
        let fs = FakeFilesystem::with_dirs(&["/work/app/typings"]);
        let (ctx, mut rx) = build_ctx(test_config(), &process, &fs, false);

        let report = build_dist(&ctx, DistOptions::default()).await.unwrap();

        assert_eq!(
            recorded(&process),
            vec![("tsc".to_string(), args(&["--declaration"]))]
        );
        assert!(report.typings.is_none());
        assert!(!report.removed_output);
        assert_eq!(
            progress_lines(&drain(&mut rx)),
            vec!["Updates JavaScript and Type Definition files..."]
        );
    }

    #[tokio::test]
    async fn test_dist_skip_typings_option() {
        let process = RecordingProcess::default();
        let fs = FakeFilesystem::default();
        let (ctx, _rx) = build_ctx(test_config(), &process, &fs, false);

        let report = build_dist(&ctx, DistOptions { skip_typings: true })
            .await
            .unwrap();
        assert!(report.typings.is_none());
        assert_eq!(recorded(&process).len(), 1);
    }

    #[tokio::test]
    async fn test_failure_stops_at_first_failing_step() {
        let process = RecordingProcess {
            fail_on: Some("matrix/dist".to_string()),
            ..RecordingProcess::default()
        };
        let fs = FakeFilesystem::default();
        let (ctx, _rx) = build_ctx(test_config(), &process, &fs, false);

        let err = build_dist(&ctx, DistOptions::default()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Ops(OpsError::CommandFailed {
                exit_code: Some(2),
                ..
            })
        ));
        // matrix2 and tsc never ran, dist was never touched
        assert_eq!(recorded(&process).len(), 1);
        assert!(fs.removed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_keep_going_records_failures() {
        let mut config = test_config();
        config.general.keep_going = true;
        let process = RecordingProcess {
            fail_on: Some("matrix/dist".to_string()),
            ..RecordingProcess::default()
        };
        let fs = FakeFilesystem::default();
        let (ctx, mut rx) = build_ctx(config, &process, &fs, false);

        let report = build_dist(&ctx, DistOptions::default()).await.unwrap();
        assert_eq!(recorded(&process).len(), 3);
        assert!(!report.success());
        assert_eq!(report.failed_steps(), 1);

        let events = drain(&mut rx);
        assert!(events.iter().any(|m| matches!(
            &m.event,
            AppEvent::General(GeneralEvent::DebugLog { message, .. })
                if message == "install matrix stderr:\nerror TS2307: Cannot find module 'matrix'"
        )));

        let result = OperationResult::DistReport(report);
        assert!(!result.is_success());
        assert_eq!(result.total_steps(), 3);
    }

    #[tokio::test]
    async fn test_missing_compiler_aborts_even_with_keep_going() {
        let mut config = test_config();
        config.general.keep_going = true;
        let process = RecordingProcess {
            missing_program: Some("tsc".to_string()),
            ..RecordingProcess::default()
        };
        let fs = FakeFilesystem::with_dirs(&["/work/app/typings"]);
        let (ctx, _rx) = build_ctx(config, &process, &fs, false);

        let err = build_dist(&ctx, DistOptions::default()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Platform(PlatformError::CommandNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_check_mode_plans_without_side_effects() {
        let process = RecordingProcess {
            missing_program: Some("typings".to_string()),
            ..RecordingProcess::default()
        };
        let fs = FakeFilesystem::with_dirs(&["/work/app/dist"]);
        let (ctx, mut rx) = build_ctx(test_config(), &process, &fs, true);

        let report = build_dist(&ctx, DistOptions::default()).await.unwrap();

        assert!(recorded(&process).is_empty());
        assert!(fs.removed.lock().unwrap().is_empty());
        assert!(!report.removed_output);
        assert_eq!(report.compile.outcome, StepOutcome::Skipped);
        assert_eq!(report.total_steps(), 3);

        let events = drain(&mut rx);
        let lines = progress_lines(&events);
        assert!(lines.contains(&"would run: tsc --declaration".to_string()));
        assert!(lines.contains(&"would remove: /work/app/dist".to_string()));
        assert!(events.iter().any(|m| matches!(
            &m.event,
            AppEvent::General(GeneralEvent::Warning { message, .. })
                if message.contains("typings was not found")
        )));
    }

    #[tokio::test]
    async fn test_dist_refuses_output_outside_project() {
        for dist_dir in ["..", "dist/..", "/work", "/work/app"] {
            let mut config = test_config();
            config.project.dist_dir = PathBuf::from(dist_dir);
            let process = RecordingProcess::default();
            let fs = FakeFilesystem::with_dirs(&["/work/app/typings", "/work/app/dist", "/work"]);
            let (ctx, _rx) = build_ctx(config, &process, &fs, false);

            let err = build_dist(&ctx, DistOptions::default()).await.unwrap_err();
            assert!(
                matches!(err, Error::Ops(OpsError::UnsafeOutputDir { .. })),
                "{dist_dir} accepted"
            );
            assert!(fs.removed.lock().unwrap().is_empty());
            assert!(recorded(&process).is_empty());
        }
    }

    #[tokio::test]
    async fn test_dist_refuses_output_resolving_outside_project() {
        let process = RecordingProcess::default();
        let fs = FakeFilesystem::with_dirs(&["/work/app/typings", "/work/app/dist"]);
        fs.links
            .lock()
            .unwrap()
            .insert(PathBuf::from("/work/app/dist"), PathBuf::from("/work"));
        let (ctx, _rx) = build_ctx(test_config(), &process, &fs, true);

        let err = build_dist(&ctx, DistOptions::default()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Ops(OpsError::UnsafeOutputDir { ref reason, .. }) if reason.contains("/work")
        ));
        assert!(fs.removed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dist_on_disk_keeps_project_for_parent_output() {
        let temp = tempfile::tempdir().unwrap();
        let app = temp.path().join("app");
        std::fs::create_dir_all(app.join("typings")).unwrap();
        std::fs::create_dir_all(app.join("dist")).unwrap();
        std::fs::write(app.join("src.ts"), "export const x = 1;").unwrap();

        for dist_dir in ["..", "dist/.."] {
            let mut config = Config::default();
            config.project.root.clone_from(&app);
            config.project.dist_dir = PathBuf::from(dist_dir);
            config.tools.compiler = "true".to_string();
            config.tools.compiler_args.clear();

            let (tx, _rx) = tsdist_events::channel();
            let ctx = OpsContextBuilder::new()
                .with_platform(Platform::native())
                .with_event_sender(tx)
                .with_config(config)
                .build()
                .unwrap();

            let err = build_dist(&ctx, DistOptions::default()).await.unwrap_err();
            assert!(matches!(err, Error::Ops(OpsError::UnsafeOutputDir { .. })));
            assert!(app.join("src.ts").exists(), "{dist_dir} removed the project");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dist_on_disk_refuses_symlinked_output() {
        let temp = tempfile::tempdir().unwrap();
        let app = temp.path().join("app");
        std::fs::create_dir_all(app.join("typings")).unwrap();
        std::fs::write(app.join("src.ts"), "export const x = 1;").unwrap();
        std::os::unix::fs::symlink(temp.path(), app.join("dist")).unwrap();

        let mut config = Config::default();
        config.project.root.clone_from(&app);
        config.tools.compiler = "true".to_string();
        config.tools.compiler_args.clear();

        let (tx, _rx) = tsdist_events::channel();
        let ctx = OpsContextBuilder::new()
            .with_platform(Platform::native())
            .with_event_sender(tx)
            .with_config(config)
            .build()
            .unwrap();

        let err = build_dist(&ctx, DistOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::Ops(OpsError::UnsafeOutputDir { .. })));
        assert!(app.join("src.ts").exists());
    }

    #[tokio::test]
    async fn test_list_definitions_and_json() {
        let process = RecordingProcess::default();
        let fs = FakeFilesystem::default();
        let (ctx, _rx) = build_ctx(test_config(), &process, &fs, false);

        let defs = list_definitions(&ctx);
        assert_eq!(defs.len(), 2);
        let json = OperationResult::Definitions(defs).to_json().unwrap();
        assert!(json.contains("\"type\": \"Definitions\""));
        assert!(json.contains("matrix2.d.ts"));
    }

    #[test]
    fn test_builder_requires_components() {
        let err = OpsContextBuilder::new()
            .with_config(Config::default())
            .build()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            Error::Ops(OpsError::MissingComponent { .. })
        ));
    }
}
