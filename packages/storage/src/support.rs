//! "Fale conosco" tickets and bug reports.

use chrono::{DateTime, Datelike as _, Duration, Utc};
use vigia_report_models::support::{SupportTicket, TicketKind, TicketStatus};

use crate::{BUG_REPORTS_KEY, ListStore, SUPPORT_TICKETS_KEY, StorageError};

/// App areas offered when filing a bug report.
pub const BUG_AREAS: &[&str] = &[
    "Login / Cadastro",
    "Envio de Denúncia",
    "Mapa / GPS",
    "Outro",
];

/// Area preselected on the bug report form.
pub const DEFAULT_BUG_AREA: &str = "Login / Cadastro";

const fn storage_key(kind: TicketKind) -> &'static str {
    match kind {
        TicketKind::Contact => SUPPORT_TICKETS_KEY,
        TicketKind::Bug => BUG_REPORTS_KEY,
    }
}

/// Formats a protocol number: prefix, year and four zero-padded digits.
#[must_use]
pub fn format_protocol(kind: TicketKind, year: i32, digits: u16) -> String {
    format!("{}-{year}{:04}", kind.protocol_prefix(), digits % 10_000)
}

fn random_digits() -> u16 {
    // Always < 10_000, so the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation)]
    let digits = (uuid::Uuid::new_v4().as_u128() % 10_000) as u16;
    digits
}

/// The answered example ticket shown before the user files anything.
fn demo_ticket(kind: TicketKind, now: DateTime<Utc>) -> SupportTicket {
    match kind {
        TicketKind::Contact => SupportTicket {
            id: "demo-1".to_string(),
            protocol: "SUP-20248821".to_string(),
            subject: "Sugestão: Linha Direta Barreiro/Pampulha".to_string(),
            message: "Gostaria de sugerir uma linha que ligasse o Barreiro à Pampulha sem \
                      passar pelo centro, para agilizar o deslocamento em horários de pico."
                .to_string(),
            status: TicketStatus::Answered,
            timestamp: (now - Duration::days(2)).timestamp_millis(),
            response: Some(
                "Olá, Cidadão! Agradecemos sua sugestão. A BHTrans já possui estudos para o \
                 sistema perimetral que contempla essa ligação. Sua mensagem foi registrada no \
                 protocolo de planejamento Nº 9928."
                    .to_string(),
            ),
        },
        TicketKind::Bug => SupportTicket {
            id: "bug-demo-1".to_string(),
            protocol: "BUG-20249102".to_string(),
            subject: "Mapa / GPS".to_string(),
            message: "O mapa não carrega quando estou no 4G, fica uma tela cinza mesmo com \
                      sinal forte."
                .to_string(),
            status: TicketStatus::Answered,
            timestamp: (now - Duration::days(3)).timestamp_millis(),
            response: Some(
                "Olá! Identificamos que isso ocorre em algumas versões do Android com o modo \
                 de economia de dados do sistema ativo. Soltamos uma correção na versão 1.2.4. \
                 Por favor, atualize seu app."
                    .to_string(),
            ),
        },
    }
}

/// Support ticket and bug report lists.
#[derive(Clone)]
pub struct SupportDesk {
    lists: ListStore,
}

impl SupportDesk {
    /// Creates a desk over `lists`.
    #[must_use]
    pub const fn new(lists: ListStore) -> Self {
        Self { lists }
    }

    /// Lists tickets of `kind`, newest first. The first read seeds the
    /// answered example ticket.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails.
    pub async fn tickets(&self, kind: TicketKind) -> Result<Vec<SupportTicket>, StorageError> {
        let now = Utc::now();
        self.lists
            .load_or_seed(storage_key(kind), || vec![demo_ticket(kind, now)])
            .await
    }

    /// Files a new PENDING ticket and returns it. For bug reports the
    /// subject is the app area where the problem happened.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::MissingField`] if the subject or message is
    /// blank, or another [`StorageError`] if the store fails.
    pub async fn open_ticket(
        &self,
        kind: TicketKind,
        subject: &str,
        message: &str,
    ) -> Result<SupportTicket, StorageError> {
        self.open_ticket_at(kind, subject, message, Utc::now()).await
    }

    async fn open_ticket_at(
        &self,
        kind: TicketKind,
        subject: &str,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<SupportTicket, StorageError> {
        if subject.trim().is_empty() {
            return Err(StorageError::MissingField { field: "subject" });
        }
        if message.trim().is_empty() {
            return Err(StorageError::MissingField { field: "message" });
        }

        let ticket = SupportTicket {
            id: uuid::Uuid::new_v4().to_string(),
            protocol: format_protocol(kind, now.year(), random_digits()),
            subject: subject.to_string(),
            message: message.to_string(),
            status: TicketStatus::Pending,
            timestamp: now.timestamp_millis(),
            response: None,
        };

        let stored = ticket.clone();
        self.lists
            .update(
                storage_key(kind),
                || vec![demo_ticket(kind, now)],
                move |tickets| {
                    tickets.insert(0, stored);
                    Ok(())
                },
            )
            .await?;

        log::info!("Opened {kind} ticket {}", ticket.protocol);

        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone as _;

    use super::*;
    use crate::memory::MemoryStore;

    fn desk() -> SupportDesk {
        SupportDesk::new(ListStore::new(Arc::new(MemoryStore::default())))
    }

    #[test]
    fn protocol_is_prefix_year_and_padded_digits() {
        assert_eq!(format_protocol(TicketKind::Contact, 2026, 42), "AT-20260042");
        assert_eq!(format_protocol(TicketKind::Bug, 2026, 9102), "BUG-20269102");
    }

    #[tokio::test]
    async fn first_read_seeds_demo_ticket() {
        let desk = desk();
        let contact = desk.tickets(TicketKind::Contact).await.unwrap();
        assert_eq!(contact.len(), 1);
        assert_eq!(contact[0].id, "demo-1");
        assert_eq!(contact[0].status, TicketStatus::Answered);

        let bugs = desk.tickets(TicketKind::Bug).await.unwrap();
        assert_eq!(bugs[0].protocol, "BUG-20249102");
    }

    #[tokio::test]
    async fn new_tickets_are_prepended_and_persisted() {
        let desk = desk();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();

        let first = desk
            .open_ticket_at(TicketKind::Contact, "Linha 4033", "Sempre atrasada", now)
            .await
            .unwrap();
        let second = desk
            .open_ticket_at(TicketKind::Contact, "Ponto", "Sem cobertura", now)
            .await
            .unwrap();

        assert!(first.protocol.starts_with("AT-2026"));
        assert_eq!(first.protocol.len(), "AT-20260000".len());
        assert_eq!(second.status, TicketStatus::Pending);

        let tickets = desk.tickets(TicketKind::Contact).await.unwrap();
        let ids: Vec<_> = tickets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str(), "demo-1"]);
    }

    #[tokio::test]
    async fn bug_reports_are_kept_apart_from_contact_tickets() {
        let desk = desk();
        desk.open_ticket(TicketKind::Bug, DEFAULT_BUG_AREA, "Tela branca")
            .await
            .unwrap();

        assert_eq!(desk.tickets(TicketKind::Bug).await.unwrap().len(), 2);
        assert_eq!(desk.tickets(TicketKind::Contact).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let desk = desk();
        assert!(matches!(
            desk.open_ticket(TicketKind::Contact, "  ", "msg").await,
            Err(StorageError::MissingField { field: "subject" })
        ));
        assert!(matches!(
            desk.open_ticket(TicketKind::Contact, "s", "").await,
            Err(StorageError::MissingField { field: "message" })
        ));
    }
}
