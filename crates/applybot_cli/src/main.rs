mod cli;
mod runner;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use applybot_core::{LaunchForm, Msg};
use applybot_engine::{Engine, ProfileSummary};
use applybot_logging::{applybot_info, applybot_warn};
use clap::Parser;
use tokio::sync::mpsc;

use cli::{Cli, Command, LaunchArgs, TokenAction};
use runner::app::{App, ExitPolicy};
use runner::credentials::FileCredentialStore;
use runner::effects::EffectRunner;
use runner::render::status_line;
use runner::settings::Settings;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut settings = Settings::load(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    settings.verbose |= cli.verbose;
    applybot_logging::initialize(settings.log_destination.into(), settings.log_level());
    applybot_info!("applybot starting against {}", settings.base_url);

    let credentials = FileCredentialStore::new(&settings.credentials_path);
    match cli.command {
        Command::Token { action } => manage_token(&credentials, &settings.token_key, action),
        Command::Status => {
            let engine = Engine::new(settings.engine_settings(), Arc::new(credentials))?;
            match engine.poller.poll().await {
                Ok(snapshot) => {
                    println!("{}", status_line(snapshot.state, &snapshot.stats));
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    let failure = err.failure();
                    eprintln!("error[{}]: {}", failure.code(), err);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Watch => {
            let engine = Engine::new(settings.engine_settings(), Arc::new(credentials))?;
            let mut app = build_app(engine, ExitPolicy::Settled);
            app.hydrate().await;
            Ok(exit_code(app.run().await.has_failure()))
        }
        Command::Launch(args) => {
            let engine = Engine::new(settings.engine_settings(), Arc::new(credentials))?;
            let profile = match engine.launcher.profile().await {
                Ok(profile) => profile,
                Err(err) => {
                    applybot_warn!("Profile unavailable: {}", err);
                    eprintln!(
                        "warning[{}]: profile unavailable, assuming no resume on file",
                        err.failure().code()
                    );
                    ProfileSummary::default()
                }
            };
            let policy = if args.detach {
                ExitPolicy::LaunchDecided
            } else {
                ExitPolicy::Settled
            };
            let form = launch_form(args, profile);

            let mut app = build_app(engine, policy);
            app.hydrate().await;
            app.step(Msg::LaunchRequested(form)).await;
            Ok(exit_code(app.run().await.has_failure()))
        }
    }
}

fn build_app(engine: Engine, policy: ExitPolicy) -> App {
    let (msg_tx, msg_rx) = mpsc::unbounded_channel();
    App::new(EffectRunner::new(engine, msg_tx), msg_rx, policy)
}

fn launch_form(args: LaunchArgs, profile: ProfileSummary) -> LaunchForm {
    let resume_on_file = profile.has_resume();
    LaunchForm {
        specialization: args.specialization.unwrap_or_default(),
        full_name: args.full_name.or(profile.full_name).unwrap_or_default(),
        location: args.location.or(profile.location).unwrap_or_default(),
        experience_level: args.experience_level.unwrap_or_default(),
        user_request: args.user_request.unwrap_or_default(),
        results_limit: args.limit,
        max_applications: args.max_applications,
        resume_on_file,
        llm_model: args.llm_model.unwrap_or_default(),
        headless: args.headless,
        timeout_sec: args.timeout_sec.unwrap_or_default(),
        captcha_wait_sec: args.captcha_wait_sec.unwrap_or_default(),
        slow_mo_ms: args.slow_mo_ms.unwrap_or_default(),
    }
}

fn manage_token(
    store: &FileCredentialStore,
    key: &str,
    action: TokenAction,
) -> anyhow::Result<ExitCode> {
    match action {
        TokenAction::Set { token } => {
            if token.trim().is_empty() {
                eprintln!("error: token must not be blank");
                return Ok(ExitCode::FAILURE);
            }
            store
                .set(key, &token)
                .with_context(|| format!("storing token in {:?}", store.path()))?;
            println!("token stored");
        }
        TokenAction::Clear => {
            let removed = store
                .clear(key)
                .with_context(|| format!("clearing token in {:?}", store.path()))?;
            println!("{}", if removed { "token cleared" } else { "no token stored" });
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn exit_code(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(specialization: Option<&str>) -> LaunchArgs {
        LaunchArgs {
            specialization: specialization.map(str::to_string),
            full_name: None,
            location: None,
            experience_level: None,
            user_request: None,
            limit: "10".to_string(),
            max_applications: "5".to_string(),
            llm_model: None,
            headless: None,
            timeout_sec: None,
            captcha_wait_sec: None,
            slow_mo_ms: None,
            detach: false,
        }
    }

    #[test]
    fn flags_win_over_profile() {
        let profile = ProfileSummary {
            full_name: Some("Ada".to_string()),
            location: Some("London".to_string()),
            resume_filename: Some("cv.pdf".to_string()),
        };
        let mut launch = args(Some("Data engineer"));
        launch.location = Some("Remote".to_string());
        launch.timeout_sec = Some("30".to_string());
        let form = launch_form(launch, profile);
        assert_eq!(form.specialization, "Data engineer");
        assert_eq!(form.full_name, "Ada");
        assert_eq!(form.location, "Remote");
        assert!(form.resume_on_file);
        let params = form.validate().unwrap();
        assert_eq!(params.timeout_sec, Some(30));
    }

    #[test]
    fn profile_fills_name_and_location() {
        let profile = ProfileSummary {
            full_name: Some("Ada Lovelace".to_string()),
            location: Some("London".to_string()),
            resume_filename: Some("cv.pdf".to_string()),
        };
        let form = launch_form(args(Some("QA")), profile);
        assert_eq!(form.full_name, "Ada Lovelace");
        assert_eq!(form.location, "London");
        let params = form.validate().unwrap();
        assert_eq!(params.location.as_deref(), Some("London"));
    }

    #[test]
    fn missing_profile_blocks_on_resume() {
        let form = launch_form(args(Some("x")), ProfileSummary::default());
        assert!(!form.resume_on_file);
        let errors = form.validate().unwrap_err();
        let codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(
            codes,
            vec!["launch.full_name_required", "launch.resume_missing"]
        );
    }
}
