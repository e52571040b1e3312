// ============================================================================
// Vues : données -> description d'affichage
// ============================================================================
// Fonctions pures qui transforment un instantané de données (Dashboard,
// CompanyDetail, ...) en lignes de texte prêtes à dessiner.
// Aucune dépendance au terminal ni au réseau : testable isolément.
// Le module ui/ se contente ensuite de placer ces chaînes dans des widgets.
// ============================================================================

use crate::format::{display_raw, format_number, format_pct};
use crate::models::{
    Cell, Company, CompanyDetail, CompanyId, Dashboard, DashboardRow, Ratios, Statement,
    StatementKind,
};

/// Messages affichés dans les différentes zones
pub mod messages {
    pub const EMPTY_DASHBOARD: &str = "No companies yet. Add one to get started.";
    pub const EMPTY_COMPANIES: &str = "No companies.";
    pub const NO_STATEMENT: &str = "No data available";

    pub const LOADING_DASHBOARD: &str = "Loading dashboard...";
    pub const LOADING_COMPANIES: &str = "Loading companies...";
    pub const LOADING_DETAIL: &str = "Loading company detail...";

    pub const ERROR_DASHBOARD: &str = "Error loading dashboard";
    pub const ERROR_COMPANIES: &str = "Error loading companies";
    pub const ERROR_DETAIL: &str = "Error loading company detail";

    pub const SECTOR_GENERATING: &str = "Generating sector analytics...";
    pub const SECTOR_ERROR: &str = "Error generating sector analytics.";
    pub const COMPANY_GENERATING: &str = "Generating company analytics...";
    pub const COMPANY_ERROR: &str = "Error generating company analytics.";

    pub const CREDENTIALS_REQUIRED: &str = "Username and password are required";
    pub const REGISTER_FAILED: &str = "Registration failed";
    pub const REGISTER_OK: &str = "Registration successful. You can now log in.";
    pub const LOGIN_FAILED: &str = "Login failed";

    pub const COMPANY_FIELDS_REQUIRED: &str = "Name, ticker and segment are required";
    pub const ADD_COMPANY_FAILED: &str = "Failed to add company";
    pub const DELETE_FAILED: &str = "Failed to delete company";

    pub const LOGIN_REQUIRED: &str = "Please log in first";
    pub const DOWNLOAD_FAILED: &str = "Failed to download report";
    pub const DOWNLOAD_ERROR: &str = "Error downloading report";
}

/// Colonnes du dashboard, ordre fixe
pub const DASHBOARD_COLUMNS: [&str; 10] = [
    "Name",
    "Segment",
    "Price",
    "Revenue",
    "Net Income",
    "Net Margin",
    "ROE",
    "D/E",
    "Current Ratio",
    "1Y Return",
];

/// En-tête de la colonne des libellés d'un état financier
pub const LINE_ITEM_HEADER: &str = "Item";

/// Tableau générique : en-têtes + lignes de cellules texte
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Vue du dashboard
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    /// Aucune société : message à la place du tableau
    Empty(&'static str),

    /// Tableau + identifiant de la société de chaque ligne (activation)
    Table {
        table: TableView,
        row_ids: Vec<CompanyId>,
    },
}

/// Ratios formatés, dans l'ordre des colonnes du dashboard (sans Name/Segment)
///
/// - Prix, D/E, Current Ratio : 2 décimales
/// - Revenue, Net Income : 0 décimale (K/M/B)
/// - Marges et rendements : pourcentage
pub fn ratio_fields(ratios: &Ratios) -> Vec<(&'static str, String)> {
    vec![
        ("Price", format_number(ratios.price, 2)),
        ("Revenue", format_number(ratios.revenue, 0)),
        ("Net Income", format_number(ratios.net_income, 0)),
        ("Net Margin", format_pct(ratios.net_margin)),
        ("ROE", format_pct(ratios.roe)),
        ("D/E", format_number(ratios.debt_to_equity, 2)),
        ("Current Ratio", format_number(ratios.current_ratio, 2)),
        ("1Y Return", format_pct(ratios.one_year_return)),
    ]
}

/// Cellules d'une ligne du dashboard
pub fn dashboard_row_cells(row: &DashboardRow) -> Vec<String> {
    let mut cells = vec![row.name.clone(), row.segment.clone()];
    cells.extend(ratio_fields(&row.ratios).into_iter().map(|(_, value)| value));
    cells
}

/// Construit la vue du dashboard
pub fn dashboard_view(dashboard: &Dashboard) -> DashboardView {
    if dashboard.is_empty() {
        return DashboardView::Empty(messages::EMPTY_DASHBOARD);
    }

    let table = TableView {
        headers: DASHBOARD_COLUMNS.iter().map(|h| h.to_string()).collect(),
        rows: dashboard.companies.iter().map(dashboard_row_cells).collect(),
    };
    let row_ids = dashboard.companies.iter().map(|row| row.id).collect();

    DashboardView::Table { table, row_ids }
}

/// Lignes de la liste des sociétés
pub fn company_list_lines(companies: &[Company]) -> Vec<String> {
    companies.iter().map(Company::label).collect()
}

/// Texte d'une cellule d'état financier : null -> chaîne vide
pub fn cell_text(cell: Option<&Cell>) -> String {
    match cell {
        None => String::new(),
        Some(Cell::Number(n)) => display_raw(*n),
        Some(Cell::Text(s)) => s.clone(),
    }
}

/// Tableau d'un état financier
///
/// Première colonne : libellé de la ligne ; ensuite les périodes de l'état.
pub fn statement_table(statement: &Statement) -> TableView {
    let mut headers = vec![LINE_ITEM_HEADER.to_string()];
    headers.extend(statement.columns.iter().cloned());

    let rows = statement
        .index
        .iter()
        .enumerate()
        .map(|(row, label)| {
            let mut cells = vec![label.clone()];
            cells.extend((0..statement.columns.len()).map(|col| cell_text(statement.cell(row, col))));
            cells
        })
        .collect();

    TableView { headers, rows }
}

/// Un état financier dans la vue détail
#[derive(Debug, Clone, PartialEq)]
pub struct StatementView {
    pub kind: StatementKind,
    /// None : état absent de la réponse
    pub table: Option<TableView>,
}

/// Vue détail d'une société
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub company_id: CompanyId,
    pub title: String,
    pub ratios: Vec<(&'static str, String)>,
    pub statements: Vec<StatementView>,
}

/// Nom affiché : info.longName, sinon le nom connu, sinon "Company <id>"
pub fn display_name(detail: &CompanyDetail, known_name: Option<&str>, id: CompanyId) -> String {
    detail
        .long_name()
        .map(str::to_string)
        .or_else(|| {
            known_name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("Company {}", id))
}

/// Construit la vue détail
pub fn detail_view(detail: &CompanyDetail, known_name: Option<&str>, id: CompanyId) -> DetailView {
    DetailView {
        company_id: id,
        title: display_name(detail, known_name, id),
        ratios: ratio_fields(&detail.ratios),
        statements: StatementKind::ALL
            .iter()
            .map(|&kind| StatementView {
                kind,
                table: detail.statement(kind).map(statement_table),
            })
            .collect(),
    }
}

impl DetailView {
    pub fn statement(&self, kind: StatementKind) -> Option<&StatementView> {
        self.statements.iter().find(|s| s.kind == kind)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
