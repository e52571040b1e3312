// ============================================================================
// Findash - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;        // Client HTTP du backend
pub mod app;        // État de l'application
pub mod config;     // Configuration (variables d'environnement)
pub mod controller; // Opérations : commandes -> appels backend -> mises à jour
pub mod error;      // Erreurs du client HTTP
pub mod format;     // Formatage des nombres et noms de fichiers
pub mod handler;    // Touches -> état local + commandes
pub mod models;     // Structures de données
pub mod session;    // Session utilisateur et persistance du token
pub mod ui;         // Interface utilisateur
pub mod view;       // Données -> description d'affichage
