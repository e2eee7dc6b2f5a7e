//! Behavior taxonomy — fixed mapping from competency to its behavior descriptors.
//!
//! Built once at startup and passed explicitly into the scorer via `AppState`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Leading ordinal numbering from the source sheet: digits, a period, optional whitespace.
/// `"3. Generar resultados"` → `"Generar resultados"`.
static ORDINAL_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("ordinal prefix regex is valid"));

/// Strips the ordinal prefix from a competency column label and trims the rest.
pub fn competency_name(label: &str) -> String {
    ORDINAL_PREFIX_RE.replace(label, "").trim().to_string()
}

/// One competency and its ordered behavior descriptors.
#[derive(Debug, Clone, Serialize)]
pub struct CompetencyBehaviors {
    pub competency: String,
    pub behaviors: Vec<String>,
}

/// Ordered, read-only competency → behaviors mapping.
#[derive(Debug, Clone)]
pub struct BehaviorTaxonomy {
    entries: Vec<CompetencyBehaviors>,
}

impl BehaviorTaxonomy {
    pub fn new(entries: Vec<CompetencyBehaviors>) -> Self {
        Self { entries }
    }

    /// The canonical eight competencies of the job valuation workbook.
    pub fn standard() -> Self {
        let entries = STANDARD_TAXONOMY
            .iter()
            .map(|(competency, behaviors)| CompetencyBehaviors {
                competency: competency.to_string(),
                behaviors: behaviors.iter().map(|b| b.to_string()).collect(),
            })
            .collect();
        Self { entries }
    }

    /// Canonical competency names, in taxonomy order.
    pub fn competencies(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.competency.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Behaviors for a competency label. The label may carry an ordinal prefix.
    /// Unknown labels yield an empty slice.
    pub fn behaviors_for(&self, label: &str) -> &[String] {
        let name = competency_name(label);
        self.entries
            .iter()
            .find(|e| e.competency == name)
            .map(|e| e.behaviors.as_slice())
            .unwrap_or(&[])
    }

    /// True if `descriptor` belongs to any competency.
    pub fn contains_behavior(&self, descriptor: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.behaviors.iter().any(|b| b == descriptor))
    }
}

const STANDARD_TAXONOMY: &[(&str, &[&str])] = &[
    ("Conocimientos técnicos", &[]),
    (
        "Desarrollar nuestro negocio",
        &[
            "Emprender, buscar y encontrar opciones mejores",
            "Hacer crecer el negocio",
            "Cumplir objetivos en el largo plazo",
            "Tomar decisiones",
            "Priorizar y decidir con velocidad",
            "Aplicar pensamiento estratégico y crear planes de negocio versátiles",
            "Usar datos para tomar decisiones",
        ],
    ),
    (
        "Desarrollarse y contribuir al desarrollo de otr@s",
        &[
            "Desarrollar conocimiento y nuevas habilidades",
            "Nutrir el talento",
            "Hacer crecer a los demás",
            "Estar disponible y accesible",
            "Hacer mentoring/coaching para maximizar el desempeño de los demás",
            "Asegurar la sucesión",
        ],
    ),
    (
        "Navegar en lo desconocido",
        &[
            "Buscar oportunidades y actuar",
            "Cuidar de la salud y el bienestar para conseguir un negocio sostenible",
            "Equilibrar la carga de trabajo",
            "Agradecer y celebrar con el equipo",
        ],
    ),
    (
        "Generar resultados",
        &[
            "Conseguir objetivos",
            "Pasión por los clientes y la decoración en el hogar",
            "Aplicar datos en el trabajo diario",
            "Simplificar y reducir costes, residuos y recursos para generar beneficios",
            "Hacer cumplir a los demás compromisos adquiridos",
            "Reconocer talentos",
            "Usar y hacer crecer el talento",
        ],
    ),
    (
        "Comunicar con impacto",
        &[
            "Comunicar de forma directa e inspiradora",
            "Dialogar con los demás",
            "Influir y hacer que las cosas sucedan",
            "Hacer que los demás entiendan su contribución en las estrategias de negocio",
        ],
    ),
    (
        "Colaborar y co-crear",
        &[
            "Crear equipos de alto rendimiento",
            "Hacer colaborar diferentes equipos, funciones, niveles, identidades y entornos",
        ],
    ),
    (
        "Liderar con el ejemplo",
        &[
            "Hacer que los demás lideren",
            "Hacer que la cultura y los valores sean parte del desempeño",
        ],
    ),
];
