// ============================================================================
// Formatage des nombres
// ============================================================================
// Fonctions pures, sans effet de bord :
// - format_number : met à l'échelle en K / M / B
// - format_pct : ratio -> pourcentage avec une décimale
// - sanitize_filename : nom de fichier sûr pour les rapports téléchargés
// ============================================================================

/// Placeholder affiché pour une valeur absente ou invalide
pub const PLACEHOLDER: &str = "-";

/// Arrondit "half away from zero" puis formate avec `decimals` décimales
///
/// CONCEPT RUST : f64::round()
/// - round() arrondit 0.5 en s'éloignant de zéro (1.5 -> 2, 2.5 -> 3)
/// - format!("{:.0}", 2.5) arrondirait au pair ("2"), d'où l'arrondi préalable
fn fixed(value: f64, decimals: usize) -> String {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    format!("{:.*}", decimals, rounded)
}

/// Formate un montant avec suffixe B / M / K
///
/// # Arguments
/// * `value` - Valeur optionnelle (None = donnée absente côté serveur)
/// * `decimals` - Nombre de décimales après mise à l'échelle
///
/// # Exemple
/// assert_eq!(format_number(Some(2500.0), 2), "2.50K");
pub fn format_number(value: Option<f64>, decimals: usize) -> String {
    let v = match value {
        Some(v) if v.is_finite() => v,
        _ => return PLACEHOLDER.to_string(),
    };

    let abs = v.abs();
    if abs >= 1e9 {
        format!("{}B", fixed(v / 1e9, decimals))
    } else if abs >= 1e6 {
        format!("{}M", fixed(v / 1e6, decimals))
    } else if abs >= 1e3 {
        format!("{}K", fixed(v / 1e3, decimals))
    } else {
        fixed(v, decimals)
    }
}

/// `format_number` avec la précision par défaut (0 décimale)
pub fn format_number_default(value: Option<f64>) -> String {
    format_number(value, 0)
}

/// Formate un ratio (0.1234) en pourcentage ("12.3%")
pub fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}%", fixed(v * 100.0, 1)),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Affiche un nombre brut tel que le serveur l'a envoyé
///
/// Les entiers (cas courant des états financiers) s'affichent sans ".0".
pub fn display_raw(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

/// Nettoie un nom de société pour en faire un nom de fichier
///
/// - Les suites d'espaces deviennent un seul "_"
/// - Tout caractère hors [A-Za-z0-9_.-] est supprimé
pub fn sanitize_filename(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join("_");
    // split_whitespace ignore les espaces en bord, on les remet comme "_"
    let leading = if name.starts_with(char::is_whitespace) { "_" } else { "" };
    let trailing = if name.ends_with(char::is_whitespace) && !collapsed.is_empty() {
        "_"
    } else {
        ""
    };

    format!("{}{}{}", leading, collapsed, trailing)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect()
}

/// Nom du fichier de rapport pour une société
pub fn report_filename(company_name: &str) -> String {
    format!("{}_financials.xlsx", sanitize_filename(company_name))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_scales() {
        assert_eq!(format_number_default(Some(1_500_000_000.0)), "2B");
        assert_eq!(format_number(Some(2500.0), 2), "2.50K");
        assert_eq!(format_number(Some(3_250_000.0), 1), "3.3M");
        assert_eq!(format_number(Some(999.0), 0), "999");
        assert_eq!(format_number(Some(12.346), 2), "12.35");
    }

    #[test]
    fn test_format_number_negative_uses_magnitude() {
        assert_eq!(format_number(Some(-2_500.0), 0), "-3K");
        assert_eq!(format_number(Some(-4_200_000_000.0), 1), "-4.2B");
    }

    #[test]
    fn test_format_number_placeholder() {
        assert_eq!(format_number(None, 2), "-");
        assert_eq!(format_number(Some(f64::NAN), 0), "-");
        assert_eq!(format_number_default(Some(f64::INFINITY)), "-");
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(Some(0.1234)), "12.3%");
        assert_eq!(format_pct(Some(-0.05)), "-5.0%");
        assert_eq!(format_pct(None), "-");
        assert_eq!(format_pct(Some(f64::NAN)), "-");
    }

    #[test]
    fn test_display_raw() {
        assert_eq!(display_raw(391035000000.0), "391035000000");
        assert_eq!(display_raw(0.25), "0.25");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Acme Logistics, Inc."), "Acme_Logistics_Inc.");
        assert_eq!(sanitize_filename("A  B\tC"), "A_B_C");
        assert_eq!(sanitize_filename("Fret/Rail (EU)"), "FretRail_EU");
        assert_eq!(report_filename("DHL Group"), "DHL_Group_financials.xlsx");
    }
}
