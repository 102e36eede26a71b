//! The interactive application.
//!
//! Renders whatever [`ViewRouter`] is showing with `dialoguer` prompts,
//! turns the answer into an [`Action`] and dispatches it. Slow work
//! (sign-in, geolocation, analysis, publishing) runs behind a spinner.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use dialoguer::{Confirm, Input, Password, Select};
use uuid::Uuid;
use vigia_ai::analysis::TransitAnalyst;
use vigia_cli_utils::{MultiProgress, spinner};
use vigia_flow::auth::{AuthMode, AuthOutcome, SIGN_IN_DELAY, SOCIAL_PROVIDERS, SOCIAL_SIGN_IN_DELAY};
use vigia_flow::discrete::{COMMENT_PLACEHOLDER, DEFAULT_PUBLISH_DELAY, EXIT_LABEL};
use vigia_flow::form::{CategorySelection, FormStep, LocationStatus, SecurityChoice};
use vigia_flow::geolocation::Geolocator;
use vigia_flow::router::{Action, Dispatched, Screen, SuccessScreen, View, ViewRouter};
use vigia_flow::submission::{PendingSubmission, SubmissionState, spawn_submission};
use vigia_report_models::registry::{SecurityOption, category_options, security_options};
use vigia_report_models::{MediaAttachment, ReportCategory};
use vigia_storage::favorites::Favorites;
use vigia_storage::preferences::PreferencesStore;
use vigia_storage::support::SupportDesk;
use vigia_storage::{KeyValueStore, ListStore};

use crate::render;
use crate::screens;

pub type DynError = Box<dyn std::error::Error>;

/// What a screen wants to happen next.
#[derive(Debug)]
pub enum Step {
    /// Hand this action to the router.
    Dispatch(Action),
    /// Show the same view again.
    Stay,
    /// Close the application.
    Quit,
}

/// Collaborators shared by every screen.
pub struct Services {
    pub analyst: Arc<dyn TransitAnalyst>,
    pub geolocator: Box<dyn Geolocator>,
    pub support: SupportDesk,
    pub favorites: Favorites,
    pub preferences: PreferencesStore,
    pub multi: MultiProgress,
}

impl Services {
    /// Builds the services over one key-value backend.
    #[must_use]
    pub fn new(
        analyst: Arc<dyn TransitAnalyst>,
        geolocator: Box<dyn Geolocator>,
        store: Arc<dyn KeyValueStore>,
        multi: MultiProgress,
    ) -> Self {
        let lists = ListStore::new(store.clone());

        Self {
            analyst,
            geolocator,
            support: SupportDesk::new(lists.clone()),
            favorites: Favorites::new(lists),
            preferences: PreferencesStore::new(store),
            multi,
        }
    }
}

pub struct App {
    router: ViewRouter,
    services: Services,
    pending: Option<(Uuid, PendingSubmission)>,
}

impl App {
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self {
            router: ViewRouter::new(),
            services,
            pending: None,
        }
    }

    /// Runs the screen loop until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if a prompt or the local store fails.
    pub async fn run(&mut self) -> Result<(), DynError> {
        loop {
            let step = match self.router.view() {
                View::Login(_) => self.login().await?,
                View::Terms => terms()?,
                View::Home { show_ad } => home(*show_ad)?,
                View::Form(_) => self.form().await?,
                View::Discrete(_) => self.discrete().await?,
                View::Success(SuccessScreen::Processing { ticket }) => {
                    let ticket = *ticket;
                    self.processing(ticket).await
                }
                View::Success(SuccessScreen::Result(state)) => success(state)?,
                View::Screen(screen) => {
                    let screen = *screen;
                    screens::show(screen, &self.services).await?
                }
            };

            match step {
                Step::Dispatch(action) => self.dispatch(action),
                Step::Stay => {}
                Step::Quit => break,
            }
        }

        println!("Até logo!");
        Ok(())
    }

    fn dispatch(&mut self, action: Action) {
        let submitted = match &action {
            Action::Submit(report) => Some(report.clone()),
            _ => None,
        };

        match self.router.dispatch(action) {
            Ok(Dispatched::Submitted { ticket }) => {
                if let Some(report) = submitted {
                    let pending = spawn_submission(self.services.analyst.clone(), report);
                    self.pending = Some((ticket, pending));
                }
            }
            Ok(Dispatched::Moved | Dispatched::Discarded) => {}
            Err(e) => log::warn!("{e}"),
        }
    }

    // -----------------------------------------------------------------------
    // Login
    // -----------------------------------------------------------------------

    async fn login(&mut self) -> Result<Step, DynError> {
        const MODES: [(AuthMode, &str); 3] = [
            (AuthMode::Login, "Entrar"),
            (AuthMode::Register, "Criar conta"),
            (AuthMode::Forgot, "Esqueci minha senha"),
        ];

        println!();
        println!("Vigia Cidadã");
        if let Some(message) = self.router.login_mut().and_then(|form| form.message()) {
            println!("{message}");
        }

        let mut labels: Vec<&str> = MODES.iter().map(|(_, label)| *label).collect();
        labels.extend_from_slice(SOCIAL_PROVIDERS);
        labels.push("Fechar");

        let idx = Select::new()
            .with_prompt("Bem-vindo")
            .items(&labels)
            .default(0)
            .interact()?;

        if idx >= MODES.len() + SOCIAL_PROVIDERS.len() {
            return Ok(Step::Quit);
        }

        if let Some(provider) = idx.checked_sub(MODES.len()).map(|i| SOCIAL_PROVIDERS[i]) {
            let Some(form) = self.router.login_mut() else {
                return Ok(Step::Stay);
            };
            let outcome = form.social_sign_in(provider);
            self.wait("Conectando...", SOCIAL_SIGN_IN_DELAY).await;
            return Ok(signed_in(&outcome));
        }

        let (mode, title) = MODES[idx];
        println!("{title}");
        let name = if mode == AuthMode::Register {
            prompt_text("Nome completo", "")?
        } else {
            String::new()
        };
        let email = prompt_text("Email", "")?;
        let password = if mode == AuthMode::Forgot {
            String::new()
        } else {
            Password::new().with_prompt("Senha").interact()?
        };

        let Some(form) = self.router.login_mut() else {
            return Ok(Step::Stay);
        };
        form.set_mode(mode);
        form.name = name;
        form.email = email;
        form.password = password;

        match form.submit() {
            Ok(AuthOutcome::RecoverySent(_)) => Ok(Step::Stay),
            Ok(outcome) => {
                self.wait(mode.submit_label(), SIGN_IN_DELAY).await;
                Ok(signed_in(&outcome))
            }
            Err(e) => {
                println!("Preencha o campo {}.", e.0);
                Ok(Step::Stay)
            }
        }
    }

    async fn wait(&self, message: &str, delay: std::time::Duration) {
        let bar = spinner(&self.services.multi, message);
        tokio::time::sleep(delay).await;
        bar.finish_and_clear();
    }

    // -----------------------------------------------------------------------
    // Report wizard
    // -----------------------------------------------------------------------

    async fn form(&mut self) -> Result<Step, DynError> {
        self.locate().await?;

        let Some(form) = self.router.form_mut() else {
            return Ok(Step::Stay);
        };

        println!();
        match form.location_status() {
            LocationStatus::Captured(position) => println!("Localização: {position}"),
            LocationStatus::Unavailable => println!("Localização indisponível"),
            LocationStatus::Locating => println!("Obtendo localização..."),
        }

        if form.step() == FormStep::Details {
            return details_step(form);
        }

        if form.shows_security_options() {
            let mut labels: Vec<String> = security_options().iter().map(security_label).collect();
            labels.push("Trocar categoria".to_string());
            labels.push("Voltar".to_string());

            let idx = Select::new()
                .with_prompt("Tipo de ocorrência")
                .items(&labels)
                .default(0)
                .interact()?;

            let Some(option) = security_options().get(idx) else {
                if idx == labels.len() - 1 {
                    return Ok(Step::Dispatch(Action::Back));
                }
                form.change_category();
                return Ok(Step::Stay);
            };

            return match form.select_security_option(option.security_type)? {
                SecurityChoice::Discrete(handoff) => {
                    Ok(Step::Dispatch(Action::TriggerDiscrete(handoff)))
                }
                SecurityChoice::Details => Ok(Step::Stay),
            };
        }

        println!("Nova denúncia (1/2)");
        let line_id = prompt_text("Linha", &form.draft().line_id)?;
        let vehicle_id = prompt_text("Número do veículo", &form.draft().vehicle_id)?;
        form.set_line_id(line_id);
        form.set_vehicle_id(vehicle_id);

        let mut labels: Vec<String> = category_options()
            .iter()
            .map(|option| format!("{} - {}", option.label, option.description))
            .collect();
        labels.push("Voltar".to_string());

        let idx = Select::new()
            .with_prompt("Categoria")
            .items(&labels)
            .default(0)
            .interact()?;

        let Some(category) = ReportCategory::all().get(idx).copied() else {
            return Ok(Step::Dispatch(Action::Back));
        };

        match form.select_category(category)? {
            CategorySelection::Details | CategorySelection::SecurityOptions => Ok(Step::Stay),
        }
    }

    /// Resolves the one-shot location request fired on wizard entry.
    async fn locate(&mut self) -> Result<(), DynError> {
        let locating = self
            .router
            .form_mut()
            .is_some_and(|form| form.location_status() == LocationStatus::Locating);
        if !locating {
            return Ok(());
        }

        let position = if self.services.preferences.load().await?.gps_allowed {
            let bar = spinner(&self.services.multi, "Obtendo localização...");
            let position = self.services.geolocator.current_position().await;
            bar.finish_and_clear();
            position
        } else {
            log::info!("Location access disabled in privacy settings");
            None
        };

        if let Some(form) = self.router.form_mut() {
            form.apply_location(position);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Discrete mode
    // -----------------------------------------------------------------------

    async fn discrete(&mut self) -> Result<Step, DynError> {
        let Some(flow) = self.router.discrete_mut() else {
            return Ok(Step::Stay);
        };
        let article = flow.article();

        println!();
        println!("{}", article.outlet);
        println!();
        println!("{}", article.headline);
        println!("{}", article.byline);
        println!();
        println!("{}", article.body);
        println!();
        println!("{} • {}", article.comments, article.shares);
        println!();

        let idx = Select::new()
            .with_prompt(article.comment_heading)
            .items(&["Comentar", EXIT_LABEL])
            .default(0)
            .interact()?;
        if idx == 1 {
            return Ok(Step::Dispatch(Action::Back));
        }

        let comment: String = Input::new()
            .with_prompt(COMMENT_PLACEHOLDER)
            .allow_empty(true)
            .interact_text()?;
        flow.set_comment(comment);
        println!("{}", article.disclaimer);

        if !flow.can_publish() {
            return Ok(Step::Stay);
        }

        let bar = spinner(&self.services.multi, "Publicando...");
        let Some(flow) = self.router.discrete_mut() else {
            bar.finish_and_clear();
            return Ok(Step::Stay);
        };
        let published = flow
            .publish(Utc::now().timestamp_millis(), DEFAULT_PUBLISH_DELAY)
            .await;
        bar.finish_and_clear();

        match published {
            Ok(report) => Ok(Step::Dispatch(Action::Submit(report))),
            Err(e) => {
                log::warn!("Comment not published: {e}");
                Ok(Step::Stay)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Success
    // -----------------------------------------------------------------------

    /// Waits for the analysis of `ticket`. Ctrl+C leaves the screen and the
    /// late result is discarded.
    async fn processing(&mut self, ticket: Uuid) -> Step {
        let pending = match self.pending.take() {
            Some((pending_ticket, pending)) if pending_ticket == ticket => pending,
            _ => {
                log::error!("No analysis running for {ticket}, using fallback");
                return Step::Dispatch(Action::AnalysisResolved {
                    ticket,
                    state: SubmissionState::fallback(),
                });
            }
        };

        let bar = spinner(&self.services.multi, "Processando denúncia...");
        let step = tokio::select! {
            state = pending.resolve() => Step::Dispatch(Action::AnalysisResolved { ticket, state }),
            _ = tokio::signal::ctrl_c() => Step::Dispatch(Action::Reset),
        };
        bar.finish_and_clear();
        step
    }
}

fn security_label(option: &SecurityOption) -> String {
    if option.trigger_discrete {
        format!("{} (Modo Discreto)", option.label)
    } else {
        option.label.to_string()
    }
}

fn signed_in(outcome: &AuthOutcome) -> Step {
    match outcome {
        AuthOutcome::SignedIn => Step::Dispatch(Action::LoginSucceeded),
        AuthOutcome::RecoverySent(_) => Step::Stay,
    }
}

pub fn prompt_text(prompt: &str, initial: &str) -> Result<String, dialoguer::Error> {
    Input::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()
}

fn details_step(form: &mut vigia_flow::form::ReportForm) -> Result<Step, DynError> {
    let draft = form.draft();
    let category = draft.category.map_or("", ReportCategory::label);
    match draft.sub_category {
        Some(sub) => println!("Nova denúncia (2/2): {category} / {}", sub.label()),
        None => println!("Nova denúncia (2/2): {category}"),
    }

    let description = prompt_text("Descreva o ocorrido", &draft.description)?;
    form.set_description(description);

    let evidence = prompt_text("Foto ou áudio (caminho do arquivo, vazio para nenhum)", "")?;
    let evidence = evidence.trim();
    if !evidence.is_empty() {
        let media = media_from_path(Path::new(evidence));
        if media.is_none() {
            println!("Arquivo não encontrado ou formato não suportado.");
        }
        form.attach_media(media);
    }

    let options = ["Enviar denúncia", "Trocar categoria", "Voltar"];
    let idx = Select::new()
        .with_prompt("Revisar")
        .items(&options)
        .default(0)
        .interact()?;

    match idx {
        0 => match form.submit(Utc::now().timestamp_millis()) {
            Ok(report) => Ok(Step::Dispatch(Action::Submit(report))),
            Err(e) => {
                println!("Não foi possível enviar: {e}");
                Ok(Step::Stay)
            }
        },
        1 => {
            form.change_category();
            Ok(Step::Stay)
        }
        _ => Ok(Step::Dispatch(Action::Back)),
    }
}

/// MIME type for the evidence formats the wizard accepts.
fn evidence_content_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        _ => return None,
    })
}

/// Builds the evidence reference for a local file. The file itself is
/// never read.
fn media_from_path(path: &Path) -> Option<MediaAttachment> {
    let content_type = evidence_content_type(path)?;
    let metadata = std::fs::metadata(path).ok()?;

    Some(MediaAttachment {
        file_name: path.file_name()?.to_string_lossy().into_owned(),
        content_type: content_type.to_string(),
        size_bytes: metadata.len(),
    })
}

fn terms() -> Result<Step, DynError> {
    println!();
    println!("Privacidade e Ética");
    println!("Sua segurança começa com transparência.");
    println!();
    println!("Termos de Uso");
    println!(
        "  Ao utilizar o Vigia Cidadã, você concorda que todas as informações \
         fornecidas são verdadeiras."
    );
    println!("Proteção de Dados");
    println!("  Seus dados pessoais nunca são compartilhados com terceiros.");
    println!("Emergências Críticas");
    println!("  Em caso de risco imediato, ligue 190.");
    println!();

    let accepted = Confirm::new()
        .with_prompt("Li e aceito os termos")
        .default(true)
        .interact()?;

    Ok(Step::Dispatch(if accepted {
        Action::AcceptTerms
    } else {
        Action::Logout
    }))
}

fn home(show_ad: bool) -> Result<Step, DynError> {
    if show_ad {
        println!();
        println!("Publicidade");
        println!("Viaje com Segurança");
        println!(
            "Conheça o novo plano de seguros para passageiros de transporte coletivo. \
             A partir de R$ 9,90."
        );
        Select::new()
            .items(&["Fechar", "Saiba Mais"])
            .default(0)
            .interact()?;
        return Ok(Step::Dispatch(Action::DismissAd));
    }

    println!();
    println!("Olá, Cidadão");
    println!();
    println!("Atrasos Linha 8207");
    println!("  Relatos de 20min de atraso na região da Lagoinha.");
    println!("  Há 15 min • 12 denúncias");
    println!("Alteração de Itinerário");
    println!("  Desvio na Av. Amazonas devido a obras.");
    println!("  Há 1 hora • BHTrans");
    println!();

    let items: [(&str, Option<Action>); 7] = [
        ("Denúncia Rápida", Some(Action::StartReport)),
        ("Trajeto", Some(Action::Open(Screen::MyRoute))),
        ("Ranking", Some(Action::Open(Screen::Stats))),
        ("Mapa de risco", Some(Action::Open(Screen::Map))),
        ("Perfil", Some(Action::Open(Screen::Profile))),
        ("Sair da conta", Some(Action::Logout)),
        ("Fechar o aplicativo", None),
    ];
    let labels: Vec<&str> = items.iter().map(|(label, _)| *label).collect();

    let idx = Select::new()
        .with_prompt("Vigia Cidadã")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(items
        .into_iter()
        .nth(idx)
        .and_then(|(_, action)| action)
        .map_or(Step::Quit, Step::Dispatch))
}

fn success(state: &SubmissionState) -> Result<Step, DynError> {
    println!();
    println!("{}", render::submission_result(state));
    println!();

    Select::new()
        .items(&["Voltar ao Início"])
        .default(0)
        .interact()?;
    Ok(Step::Dispatch(Action::Reset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_labels_flag_discrete_option() {
        let labels: Vec<String> = security_options().iter().map(security_label).collect();
        assert_eq!(labels[0], "Assédio (Modo Discreto)");
        assert_eq!(labels[1], "Roubo/Furto");
        assert_eq!(labels.iter().filter(|l| l.contains("Modo Discreto")).count(), 1);
    }

    #[test]
    fn evidence_types_by_extension() {
        assert_eq!(
            evidence_content_type(Path::new("foto.JPG")),
            Some("image/jpeg")
        );
        assert_eq!(evidence_content_type(Path::new("audio.m4a")), Some("audio/mp4"));
        assert_eq!(evidence_content_type(Path::new("notas.txt")), None);
        assert_eq!(evidence_content_type(Path::new("sem_extensao")), None);
    }

    #[test]
    fn media_reference_reads_size_only() {
        let dir = std::env::temp_dir().join(format!("vigia-cli-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("onibus.png");
        std::fs::write(&path, [0_u8; 16]).unwrap();

        let media = media_from_path(&path).unwrap();
        assert_eq!(media.file_name, "onibus.png");
        assert_eq!(media.content_type, "image/png");
        assert_eq!(media.size_bytes, 16);

        assert!(media_from_path(&dir.join("missing.png")).is_none());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn social_sign_in_dispatches_login() {
        assert!(matches!(
            signed_in(&AuthOutcome::SignedIn),
            Step::Dispatch(Action::LoginSucceeded)
        ));
        assert!(matches!(
            signed_in(&AuthOutcome::RecoverySent("ok")),
            Step::Stay
        ));
    }
}
