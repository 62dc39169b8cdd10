//! Fixed catalogs the generator samples from.

/// A billable service category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub code: &'static str,
    pub description: &'static str,
    pub unit: &'static str,
}

/// Carrier issuing the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operator {
    pub name: &'static str,
    pub cnpj: &'static str,
}

pub const CATEGORIES: [Category; 5] = [
    Category {
        code: "celular",
        description: "Plano Pós-Pago 20GB",
        unit: "linha",
    },
    Category {
        code: "televisao",
        description: "TV HD Empresarial (1 ponto)",
        unit: "ponto",
    },
    Category {
        code: "fibra",
        description: "Internet Fibra 300 Mbps",
        unit: "servico",
    },
    Category {
        code: "voz",
        description: "Voz Ilimitada",
        unit: "linha",
    },
    Category {
        code: "iot",
        description: "Conectividade IoT",
        unit: "servico",
    },
];

pub const OPERATORS: [Operator; 1] = [Operator {
    name: "Vivo",
    cnpj: "00.000.000/0001-01",
}];

pub const CLIENTS: [&str; 8] = [
    "Empresa Alpha Ltda",
    "Empresa Beta SA",
    "Empresa Gamma Tech",
    "Empresa Delta Telecom",
    "Empresa Nova Telecom",
    "Empresa Orion Sistemas",
    "Empresa Aurora Digital",
    "Empresa Sigma Networks",
];

/// Taxes applied to every line item, in billing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaxKind {
    Icms,
    Pis,
    Cofins,
}

impl TaxKind {
    pub const ALL: [TaxKind; 3] = [TaxKind::Icms, TaxKind::Pis, TaxKind::Cofins];

    pub fn code(self) -> &'static str {
        match self {
            TaxKind::Icms => "ICMS",
            TaxKind::Pis => "PIS",
            TaxKind::Cofins => "COFINS",
        }
    }

    pub fn rate(self) -> f64 {
        match self {
            TaxKind::Icms => 0.25,
            TaxKind::Pis => 0.0165,
            TaxKind::Cofins => 0.076,
        }
    }
}

pub const MIN_ITEMS: usize = 2;
pub const MAX_ITEMS: usize = 5;
pub const MIN_BASE_VALUE: f64 = 40.0;
pub const MAX_BASE_VALUE: f64 = 200.0;
/// How far back from the reference instant a billing period may start.
pub const MAX_PERIOD_DAYS_BACK: i64 = 120;
pub const PERIOD_LENGTH_DAYS: i64 = 30;

pub const INVOICE_KIND: &str = "fatura_telecom";
pub const CURRENCY: &str = "BRL";
pub const PAYMENT_METHOD: &str = "debito_automatico";
pub const PAYMENT_STATUS: &str = "em_aberto";
pub const SOURCE: &str = "mock_generator";

pub fn category(code: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|category| category.code == code)
}
