/// All localized user-facing strings for a language
///
/// Strings are stored raw; HTML escaping happens in the templates. Fields
/// with placeholders document them below and are filled with `str::replace`.
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    // ==================== Navigation ====================
    pub nav_programme: &'static str,
    pub nav_news: &'static str,
    pub nav_archives: &'static str,
    pub nav_partners: &'static str,
    pub nav_speakers: &'static str,
    pub nav_committee: &'static str,
    pub nav_themes: &'static str,

    // ==================== Collection Loading ====================
    /// Shown while a collection request is in flight
    pub loading: &'static str,

    /// Shown when a collection could not be fetched or parsed
    pub load_failed: &'static str,

    /// Label of the retry affordance
    pub retry: &'static str,

    /// Shown when a collection loaded successfully but is empty
    pub empty_collection: &'static str,

    /// Shown for unknown pages
    pub not_found: &'static str,

    // ==================== Programme ====================
    pub programme_heading: &'static str,

    /// Shown when the programme has no days
    pub no_programme: &'static str,

    /// Tab label for a day. Placeholders: {number}
    pub day_label: &'static str,

    pub export_button: &'static str,
    pub speaker_label: &'static str,
    pub location_label: &'static str,

    /// Labels for each event type, in `EventType::ALL` order
    pub event_labels: [&'static str; 12],

    // ==================== Export ====================
    /// Shown when an export is requested for an empty programme
    pub export_no_days: &'static str,

    /// Shown when no day could be written to the document
    pub export_failed: &'static str,

    /// Title page line. Placeholders: {date}
    pub generated_on: &'static str,

    // ==================== Dates ====================
    /// Monday first
    pub weekdays: [&'static str; 7],
    pub months: [&'static str; 12],

    /// Placeholders: {weekday}, {day}, {month}, {year}
    pub date_pattern: &'static str,

    // ==================== Forms ====================
    pub field_required: &'static str,
    pub field_not_numeric: &'static str,
    pub field_negative: &'static str,
    pub field_invalid_url: &'static str,
    pub field_invalid_date: &'static str,
    pub field_invalid_time: &'static str,
    pub field_invalid_event_type: &'static str,

    /// Summary shown above a form with invalid fields
    pub form_invalid: &'static str,

    /// Consolidated message for a failed write
    pub form_submit_failed: &'static str,

    /// Shown when a second submit arrives while one is in flight
    pub form_busy: &'static str,

    pub delete_failed: &'static str,

    // ==================== Authentication ====================
    pub login_heading: &'static str,
    pub email_label: &'static str,
    pub password_label: &'static str,
    pub login_button: &'static str,
    pub login_failed: &'static str,
    pub logout_button: &'static str,

    // ==================== Admin ====================
    pub dashboard_heading: &'static str,
    pub registrations_heading: &'static str,

    /// Rendered in place of a count that could not be fetched
    pub count_unavailable: &'static str,

    pub new_entry: &'static str,
    pub edit: &'static str,
    pub delete: &'static str,
    pub save: &'static str,
    pub cancel: &'static str,
    pub actions: &'static str,
}

impl LanguageStrings {
    /// Label for an event type ordinal, see `EventType::ordinal`.
    pub fn event_label(&self, ordinal: usize) -> &'static str {
        self.event_labels
            .get(ordinal)
            .copied()
            .unwrap_or(self.event_labels[self.event_labels.len() - 1])
    }

    /// Format a calendar date without relying on platform locale data.
    pub fn format_date(&self, date: chrono::NaiveDate) -> String {
        use chrono::Datelike;

        let weekday = self.weekdays[date.weekday().num_days_from_monday() as usize];
        let month = self.months[date.month0() as usize];

        self.date_pattern
            .replace("{weekday}", weekday)
            .replace("{day}", &date.day().to_string())
            .replace("{month}", month)
            .replace("{year}", &date.year().to_string())
    }

    /// Fill the `{number}` placeholder of `day_label` (1-based).
    pub fn day_tab(&self, index: usize) -> String {
        self.day_label.replace("{number}", &(index + 1).to_string())
    }
}

// ==================== French Strings ====================

/// French language strings (canonical)
pub static FRENCH_STRINGS: LanguageStrings = LanguageStrings {
    nav_programme: "Programme",
    nav_news: "Actualités",
    nav_archives: "Archives",
    nav_partners: "Partenaires",
    nav_speakers: "Intervenants",
    nav_committee: "Comité",
    nav_themes: "Thématiques",

    loading: "Chargement…",
    load_failed: "Impossible de charger les données. Veuillez réessayer.",
    retry: "Réessayer",
    empty_collection: "Aucun élément à afficher pour le moment.",
    not_found: "Page introuvable.",

    programme_heading: "Programme du colloque",
    no_programme: "Le programme n'est pas encore disponible.",
    day_label: "Jour {number}",
    export_button: "Télécharger le programme (PDF)",
    speaker_label: "Intervenant",
    location_label: "Lieu",
    event_labels: [
        "Conférence plénière",
        "Session",
        "Atelier",
        "Table ronde",
        "Pause",
        "Repas",
        "Réseautage",
        "Cérémonie",
        "Accueil",
        "Démonstration",
        "Clôture",
        "Activité",
    ],

    export_no_days: "Le programme est vide : aucun document n'a été généré.",
    export_failed: "La génération du programme PDF a échoué.",
    generated_on: "Généré le {date}",

    weekdays: [
        "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
    ],
    months: [
        "janvier",
        "février",
        "mars",
        "avril",
        "mai",
        "juin",
        "juillet",
        "août",
        "septembre",
        "octobre",
        "novembre",
        "décembre",
    ],
    date_pattern: "{weekday} {day} {month} {year}",

    field_required: "Ce champ est obligatoire.",
    field_not_numeric: "Veuillez saisir un nombre entier.",
    field_negative: "La valeur ne peut pas être négative.",
    field_invalid_url: "Veuillez saisir une adresse web valide (http ou https).",
    field_invalid_date: "Veuillez saisir une date au format AAAA-MM-JJ.",
    field_invalid_time: "Veuillez saisir une heure au format HH:MM.",
    field_invalid_event_type: "Type d'activité inconnu.",
    form_invalid: "Veuillez corriger les champs indiqués.",
    form_submit_failed: "L'enregistrement a échoué. Vos saisies ont été conservées, veuillez réessayer.",
    form_busy: "Un enregistrement est déjà en cours.",
    delete_failed: "La suppression a échoué. Veuillez réessayer.",

    login_heading: "Connexion à l'administration",
    email_label: "Adresse e-mail",
    password_label: "Mot de passe",
    login_button: "Se connecter",
    login_failed: "Identifiants invalides ou service indisponible.",
    logout_button: "Se déconnecter",

    dashboard_heading: "Tableau de bord",
    registrations_heading: "Inscriptions",
    count_unavailable: "indisponible",
    new_entry: "Ajouter",
    edit: "Modifier",
    delete: "Supprimer",
    save: "Enregistrer",
    cancel: "Annuler",
    actions: "Actions",
};

// ==================== English Strings ====================

/// English language strings
pub static ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    nav_programme: "Programme",
    nav_news: "News",
    nav_archives: "Archives",
    nav_partners: "Partners",
    nav_speakers: "Speakers",
    nav_committee: "Committee",
    nav_themes: "Themes",

    loading: "Loading…",
    load_failed: "We couldn't load this content. Please try again.",
    retry: "Retry",
    empty_collection: "Nothing to show yet.",
    not_found: "Page not found.",

    programme_heading: "Conference programme",
    no_programme: "The programme is not available yet.",
    day_label: "Day {number}",
    export_button: "Download the programme (PDF)",
    speaker_label: "Speaker",
    location_label: "Location",
    event_labels: [
        "Keynote",
        "Session",
        "Workshop",
        "Panel",
        "Break",
        "Meal",
        "Networking",
        "Ceremony",
        "Welcome",
        "Demo",
        "Closing",
        "Activity",
    ],

    export_no_days: "The programme is empty: no document was generated.",
    export_failed: "Generating the PDF programme failed.",
    generated_on: "Generated on {date}",

    weekdays: [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ],
    months: [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ],
    date_pattern: "{weekday}, {month} {day}, {year}",

    field_required: "This field is required.",
    field_not_numeric: "Please enter a whole number.",
    field_negative: "The value cannot be negative.",
    field_invalid_url: "Please enter a valid web address (http or https).",
    field_invalid_date: "Please enter a date as YYYY-MM-DD.",
    field_invalid_time: "Please enter a time as HH:MM.",
    field_invalid_event_type: "Unknown activity type.",
    form_invalid: "Please correct the highlighted fields.",
    form_submit_failed: "Saving failed. Your input was kept, please try again.",
    form_busy: "A save is already in progress.",
    delete_failed: "Deleting failed. Please try again.",

    login_heading: "Administration login",
    email_label: "Email address",
    password_label: "Password",
    login_button: "Log in",
    login_failed: "Invalid credentials or service unavailable.",
    logout_button: "Log out",

    dashboard_heading: "Dashboard",
    registrations_heading: "Registrations",
    count_unavailable: "unavailable",
    new_entry: "Add",
    edit: "Edit",
    delete: "Delete",
    save: "Save",
    cancel: "Cancel",
    actions: "Actions",
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    // ==================== Date Formatting Tests ====================

    #[test]
    fn test_format_date_french() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 24).unwrap();
        assert_eq!(FRENCH_STRINGS.format_date(date), "vendredi 24 octobre 2025");
    }

    #[test]
    fn test_format_date_english() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 25).unwrap();
        assert_eq!(ENGLISH_STRINGS.format_date(date), "Saturday, October 25, 2025");
    }

    // ==================== Placeholder Tests ====================

    #[test]
    fn test_day_tab_is_one_based() {
        assert_eq!(FRENCH_STRINGS.day_tab(0), "Jour 1");
        assert_eq!(ENGLISH_STRINGS.day_tab(2), "Day 3");
    }

    #[test]
    fn test_generated_on_placeholder() {
        assert!(FRENCH_STRINGS.generated_on.contains("{date}"));
        assert!(ENGLISH_STRINGS.generated_on.contains("{date}"));
    }

    #[test]
    fn test_event_label_out_of_range_falls_back_to_last() {
        assert_eq!(ENGLISH_STRINGS.event_label(99), "Activity");
        assert_eq!(FRENCH_STRINGS.event_label(0), "Conférence plénière");
    }

    // ==================== Completeness Tests ====================

    #[test]
    fn test_user_facing_messages_not_empty() {
        for strings in [&FRENCH_STRINGS, &ENGLISH_STRINGS] {
            assert!(!strings.load_failed.is_empty());
            assert!(!strings.no_programme.is_empty());
            assert!(!strings.export_no_days.is_empty());
            assert!(!strings.form_submit_failed.is_empty());
            assert!(strings.event_labels.iter().all(|label| !label.is_empty()));
        }
    }
}
