//! Static category and security-option registry.
//!
//! The registry is a closed lookup table: every [`ReportCategory`] has
//! exactly one [`CategoryOption`] and every [`SecurityType`] exactly one
//! [`SecurityOption`].

use serde::Serialize;

use crate::{ReportCategory, SecurityType};

/// Picker entry for a top-level category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOption {
    /// The category this entry selects.
    pub category: ReportCategory,
    /// Display label.
    pub label: &'static str,
    /// Icon reference for the front end.
    pub icon: &'static str,
    /// One-line hint of what belongs in this category.
    pub description: &'static str,
}

/// Picker entry for a security sub-type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityOption {
    /// The sub-type this entry selects.
    pub security_type: SecurityType,
    /// Display label.
    pub label: &'static str,
    /// Icon reference for the front end.
    pub icon: &'static str,
    /// Selecting this option diverts to the discrete interface.
    pub trigger_discrete: bool,
}

const CATEGORY_OPTIONS: [CategoryOption; 3] = [
    CategoryOption {
        category: ReportCategory::Security,
        label: "Segurança",
        icon: "shield-alert",
        description: "Assédio, roubo ou violência.",
    },
    CategoryOption {
        category: ReportCategory::Infrastructure,
        label: "Infraestrutura",
        icon: "wrench",
        description: "Ar-condicionado, bancos, limpeza.",
    },
    CategoryOption {
        category: ReportCategory::Service,
        label: "Serviço",
        icon: "clock",
        description: "Atrasos, direção perigosa, queima de parada.",
    },
];

const SECURITY_OPTIONS: [SecurityOption; 4] = [
    SecurityOption {
        security_type: SecurityType::Harassment,
        label: "Assédio",
        icon: "eye-off",
        trigger_discrete: true,
    },
    SecurityOption {
        security_type: SecurityType::Theft,
        label: "Roubo/Furto",
        icon: "alert-triangle",
        trigger_discrete: false,
    },
    SecurityOption {
        security_type: SecurityType::Aggression,
        label: "Agressão Física",
        icon: "shield-alert",
        trigger_discrete: false,
    },
    SecurityOption {
        security_type: SecurityType::Suspicious,
        label: "Atitude Suspeita",
        icon: "alert-triangle",
        trigger_discrete: false,
    },
];

/// All category picker entries, in display order.
#[must_use]
pub const fn category_options() -> &'static [CategoryOption] {
    &CATEGORY_OPTIONS
}

/// Looks up the picker entry for a category.
#[must_use]
pub const fn category_option(category: ReportCategory) -> &'static CategoryOption {
    match category {
        ReportCategory::Security => &CATEGORY_OPTIONS[0],
        ReportCategory::Infrastructure => &CATEGORY_OPTIONS[1],
        ReportCategory::Service => &CATEGORY_OPTIONS[2],
    }
}

/// All security sub-type entries, in display order.
#[must_use]
pub const fn security_options() -> &'static [SecurityOption] {
    &SECURITY_OPTIONS
}

/// Looks up the picker entry for a security sub-type.
#[must_use]
pub const fn security_option(security_type: SecurityType) -> &'static SecurityOption {
    match security_type {
        SecurityType::Harassment => &SECURITY_OPTIONS[0],
        SecurityType::Theft => &SECURITY_OPTIONS[1],
        SecurityType::Aggression => &SECURITY_OPTIONS[2],
        SecurityType::Suspicious => &SECURITY_OPTIONS[3],
    }
}
