//! Peripheral screens: ranking, risk map, favorite lines, profile,
//! achievements, settings, privacy and support.

use dialoguer::{Confirm, MultiSelect, Select};
use vigia_ai::analysis::{line_ranking_or_empty, regional_risk_or_empty};
use vigia_cli_utils::spinner;
use vigia_flow::router::{Action, Screen};
use vigia_report_models::insights::{DEFAULT_CITY, DEFAULT_UF};
use vigia_report_models::support::{FontSize, Preferences, TicketKind};
use vigia_storage::StorageError;
use vigia_storage::support::{BUG_AREAS, DEFAULT_BUG_AREA};

use crate::app::{DynError, Services, Step, prompt_text};
use crate::render;

/// Renders `screen` and returns what the user chose.
///
/// # Errors
///
/// Returns an error if a prompt or the local store fails.
pub async fn show(screen: Screen, services: &Services) -> Result<Step, DynError> {
    println!();
    match screen {
        Screen::Stats => stats(services).await,
        Screen::Map => map(services).await,
        Screen::MyRoute => my_route(services).await,
        Screen::Profile => profile(),
        Screen::ProfileEdit => profile_edit(),
        Screen::Achievements => achievements(),
        Screen::PrivacySettings => privacy(services).await,
        Screen::Settings => settings(services).await,
        Screen::Support => support(services).await,
    }
}

fn back_or_stay(labels: &[&str]) -> Result<bool, dialoguer::Error> {
    let idx = Select::new().items(labels).default(0).interact()?;
    Ok(idx + 1 == labels.len())
}

async fn stats(services: &Services) -> Result<Step, DynError> {
    println!("Ranking de Linhas");
    let uf = prompt_text("UF", DEFAULT_UF)?;
    let city = prompt_text("Cidade", DEFAULT_CITY)?;

    let bar = spinner(&services.multi, "Consultando denúncias das últimas 24h...");
    let ranking = line_ranking_or_empty(services.analyst.as_ref(), uf.trim(), city.trim()).await;
    bar.finish_and_clear();

    println!("Linhas com mais denúncias em {city}/{uf} (24h)");
    println!("{}", render::ranking_table(&ranking));

    Ok(if back_or_stay(&["Atualizar", "Voltar"])? {
        Step::Dispatch(Action::Back)
    } else {
        Step::Stay
    })
}

async fn map(services: &Services) -> Result<Step, DynError> {
    println!("Mapa de Risco - Belo Horizonte");

    let bar = spinner(&services.multi, "Analisando regionais...");
    let risk = regional_risk_or_empty(services.analyst.as_ref()).await;
    bar.finish_and_clear();

    println!("{}", render::regions_table(&risk));

    Ok(if back_or_stay(&["Atualizar", "Voltar"])? {
        Step::Dispatch(Action::Back)
    } else {
        Step::Stay
    })
}

async fn my_route(services: &Services) -> Result<Step, DynError> {
    println!("Meu Trajeto");
    let lines = services.favorites.list().await?;
    if lines.is_empty() {
        println!("Nenhuma linha favorita.");
    }
    for line in &lines {
        println!("{}", render::favorite_row(line));
    }
    println!();

    let idx = Select::new()
        .items(&["Adicionar linha", "Remover linha", "Voltar"])
        .default(0)
        .interact()?;

    match idx {
        0 => {
            let number = prompt_text("Número da linha", "")?;
            let name = prompt_text("Nome / itinerário", "")?;
            match services.favorites.add(&number, &name).await {
                Ok(line) => println!("Linha {} adicionada.", line.number),
                Err(e) => report_rejection(e)?,
            }
            Ok(Step::Stay)
        }
        1 if !lines.is_empty() => {
            let labels: Vec<String> = lines.iter().map(render::favorite_row).collect();
            let idx = Select::new()
                .with_prompt("Remover qual linha?")
                .items(&labels)
                .default(0)
                .interact()?;
            if services.favorites.remove(&lines[idx].number).await? {
                println!("Linha {} removida.", lines[idx].number);
            }
            Ok(Step::Stay)
        }
        1 => Ok(Step::Stay),
        _ => Ok(Step::Dispatch(Action::Back)),
    }
}

/// Prints validation failures; anything else is a real error.
fn report_rejection(e: StorageError) -> Result<(), StorageError> {
    match e {
        StorageError::MissingField { field } => {
            println!("Preencha o campo {field}.");
            Ok(())
        }
        StorageError::Duplicate(what) => {
            println!("{what} já está na lista.");
            Ok(())
        }
        other => Err(other),
    }
}

fn profile() -> Result<Step, DynError> {
    println!("Meu Perfil");
    println!("Cidadão Consciente  usuario@exemplo.com");
    println!("Nível 3 • Verificado");
    println!("Denúncias 42  Precisão 98%  Pontos 450");
    println!();

    let items: [(&str, Action); 7] = [
        ("Dados Pessoais", Action::Open(Screen::ProfileEdit)),
        ("Conquistas", Action::Open(Screen::Achievements)),
        ("Privacidade e Segurança", Action::Open(Screen::PrivacySettings)),
        ("Configurações", Action::Open(Screen::Settings)),
        ("Suporte", Action::Open(Screen::Support)),
        ("Sair da conta", Action::Logout),
        ("Voltar", Action::Back),
    ];
    let labels: Vec<&str> = items.iter().map(|(label, _)| *label).collect();

    let idx = Select::new().items(&labels).default(0).interact()?;
    Ok(items
        .into_iter()
        .nth(idx)
        .map_or(Step::Stay, |(_, action)| Step::Dispatch(action)))
}

fn profile_edit() -> Result<Step, DynError> {
    println!("Dados Pessoais");
    let name = prompt_text("Nome completo", "Cidadão Consciente")?;
    prompt_text("Celular / WhatsApp", "")?;
    prompt_text("E-mail", "usuario@exemplo.com")?;
    prompt_text("CEP", "")?;

    if Confirm::new()
        .with_prompt("Salvar alterações?")
        .default(true)
        .interact()?
    {
        log::info!("Profile updated for {}", name.trim());
        println!("Dados atualizados com sucesso!");
    }
    Ok(Step::Dispatch(Action::Back))
}

fn achievements() -> Result<Step, DynError> {
    println!("Minhas Conquistas");
    println!();
    println!("Nível de Confiabilidade: 850 (Alta Prioridade)");
    println!(
        "  Suas denúncias são validadas frequentemente. Relatos de usuários com \
         score alto aparecem primeiro para as autoridades."
    );
    println!("Impacto Social: 1.240 pessoas ajudadas • 450 pts");
    println!(
        "  Em breve: Troque seus pontos por descontos em cursos e benefícios no transporte."
    );
    println!();

    Select::new().items(&["Voltar"]).default(0).interact()?;
    Ok(Step::Dispatch(Action::Back))
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// Labels and current values of the privacy toggles.
fn privacy_toggles(preferences: &Preferences) -> [(&'static str, bool); 5] {
    [
        ("Denúncias anônimas", preferences.anonymous_reports),
        ("Desbloqueio por biometria", preferences.biometric_enabled),
        ("Modo camuflagem", preferences.camouflage_mode),
        ("Acesso à localização", preferences.gps_allowed),
        ("Acesso à câmera", preferences.camera_allowed),
    ]
}

/// Applies the toggles picked in the multi-select.
fn apply_privacy(preferences: &mut Preferences, selected: &[usize]) {
    let on = |i: usize| selected.contains(&i);
    preferences.anonymous_reports = on(0);
    preferences.biometric_enabled = on(1);
    preferences.camouflage_mode = on(2);
    preferences.gps_allowed = on(3);
    preferences.camera_allowed = on(4);
}

async fn privacy(services: &Services) -> Result<Step, DynError> {
    println!("Privacidade e Segurança");
    let mut preferences = services.preferences.load().await?;

    let toggles = privacy_toggles(&preferences);
    let labels: Vec<&str> = toggles.iter().map(|(label, _)| *label).collect();
    let defaults: Vec<bool> = toggles.iter().map(|(_, on)| *on).collect();

    let selected = MultiSelect::new()
        .with_prompt("Espaço alterna, Enter salva")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;

    apply_privacy(&mut preferences, &selected);
    services.preferences.save(&preferences).await?;
    println!("Preferências salvas.");
    Ok(Step::Dispatch(Action::Back))
}

const FONT_SIZES: [(FontSize, &str); 3] = [
    (FontSize::Small, "Pequeno"),
    (FontSize::Medium, "Médio"),
    (FontSize::Large, "Grande"),
];

const fn on_off(value: bool) -> &'static str {
    if value { "ativado" } else { "desativado" }
}

fn font_label(size: FontSize) -> &'static str {
    FONT_SIZES
        .iter()
        .find(|(s, _)| *s == size)
        .map_or("Médio", |(_, label)| *label)
}

async fn settings(services: &Services) -> Result<Step, DynError> {
    println!("Configurações");
    let mut preferences = services.preferences.load().await?;

    let labels = [
        format!("Notificações push: {}", on_off(preferences.push_enabled)),
        format!("Linha para alertas: {}", preferences.favorite_line),
        format!("Tamanho do texto: {}", font_label(preferences.font_size)),
        format!("Alto contraste: {}", on_off(preferences.high_contrast)),
        format!("Economia de dados: {}", on_off(preferences.data_saver)),
        "Voltar".to_string(),
    ];

    let idx = Select::new().items(&labels).default(0).interact()?;
    match idx {
        0 => preferences.push_enabled = !preferences.push_enabled,
        1 => preferences.favorite_line = prompt_text("Linha", &preferences.favorite_line)?,
        2 => {
            let names: Vec<&str> = FONT_SIZES.iter().map(|(_, label)| *label).collect();
            let pick = Select::new()
                .with_prompt("Tamanho do texto")
                .items(&names)
                .default(1)
                .interact()?;
            preferences.font_size = FONT_SIZES[pick].0;
        }
        3 => preferences.high_contrast = !preferences.high_contrast,
        4 => preferences.data_saver = !preferences.data_saver,
        _ => return Ok(Step::Dispatch(Action::Back)),
    }

    services.preferences.save(&preferences).await?;
    Ok(Step::Stay)
}

// ---------------------------------------------------------------------------
// Support
// ---------------------------------------------------------------------------

async fn support(services: &Services) -> Result<Step, DynError> {
    println!("Central de Ajuda");

    let idx = Select::new()
        .items(&[
            "Fale conosco",
            "Reportar um bug",
            "Meus atendimentos",
            "Meus reportes de bug",
            "Voltar",
        ])
        .default(0)
        .interact()?;

    match idx {
        0 => {
            let subject = prompt_text("Assunto", "")?;
            let message = prompt_text("Mensagem", "")?;
            open_ticket(services, TicketKind::Contact, &subject, &message).await?;
        }
        1 => {
            let default = BUG_AREAS
                .iter()
                .position(|area| *area == DEFAULT_BUG_AREA)
                .unwrap_or(0);
            let area = Select::new()
                .with_prompt("Onde aconteceu o problema?")
                .items(BUG_AREAS)
                .default(default)
                .interact()?;
            let message = prompt_text("Descreva o problema", "")?;
            open_ticket(services, TicketKind::Bug, BUG_AREAS[area], &message).await?;
        }
        2 | 3 => {
            let kind = if idx == 2 {
                TicketKind::Contact
            } else {
                TicketKind::Bug
            };
            for ticket in services.support.tickets(kind).await? {
                println!("{}", render::ticket_card(&ticket));
                println!();
            }
        }
        _ => return Ok(Step::Dispatch(Action::Back)),
    }

    Ok(Step::Stay)
}

async fn open_ticket(
    services: &Services,
    kind: TicketKind,
    subject: &str,
    message: &str,
) -> Result<(), StorageError> {
    match services.support.open_ticket(kind, subject, message).await {
        Ok(ticket) => {
            println!("Enviado! Protocolo {}", ticket.protocol);
            Ok(())
        }
        Err(e) => report_rejection(e),
    }
}
