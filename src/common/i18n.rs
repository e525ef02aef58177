// src/common/i18n.rs

/// Idioma usado quando o cliente não envia Accept-Language (ou envia um que não temos).
pub const DEFAULT_LANG: &str = "ro";

// Tabela estática de mensagens: (chave, ro, en, pt)
const MESSAGES: &[(&str, &str, &str, &str)] = &[
    ("validation_failed", "Unul sau mai multe câmpuri sunt invalide.", "One or more fields are invalid.", "Um ou mais campos são inválidos."),
    ("required", "Acest câmp este obligatoriu.", "This field is required.", "Este campo é obrigatório."),
    ("non_negative", "Valoarea nu poate fi negativă.", "The value cannot be negative.", "O valor não pode ser negativo."),
    ("positive", "Valoarea trebuie să fie mai mare decât zero.", "The value must be greater than zero.", "O valor deve ser maior que zero."),
    ("out_of_range", "Valoarea este în afara intervalului permis.", "The value is out of range.", "O valor está fora do intervalo permitido."),
    ("approval_fields", "Aprobarea se face doar prin fluxul de aprobare.", "Approval is only possible through the approval flow.", "A aprovação só pode ser feita pelo fluxo de aprovação."),
    ("invalid_payload", "Cererea este invalidă.", "The request body is invalid.", "O corpo da requisição é inválido."),
    ("record_not_found", "Înregistrarea nu a fost găsită.", "Record not found.", "Registro não encontrado."),
    ("unknown_table", "Tabel necunoscut.", "Unknown table.", "Tabela desconhecida."),
    ("shift_locked", "Raportul este aprobat și nu mai poate fi modificat.", "The report is approved and can no longer be changed.", "O relatório está aprovado e não pode mais ser alterado."),
    ("invalid_transition", "Schimbarea de stare nu este permisă.", "This status change is not allowed.", "Esta mudança de estado não é permitida."),
    ("employee_not_assigned", "Angajatul nu este alocat acestui raport.", "The employee is not assigned to this report.", "O funcionário não está alocado neste relatório."),
    ("missing_tenant", "Lipsește tenantul din sesiune.", "Missing tenant in session.", "Tenant ausente na sessão."),
    ("unauthorized", "Neautorizat.", "Unauthorized.", "Não autorizado."),
    ("remote_failure", "Eroare de comunicare cu serverul.", "Could not reach the server.", "Falha de comunicação com o servidor."),
    ("timeout", "Serverul nu a răspuns la timp.", "The server did not answer in time.", "O servidor não respondeu a tempo."),
    ("notification_failed", "Notificarea nu a putut fi trimisă.", "The notification could not be sent.", "A notificação não pôde ser enviada."),
    ("internal", "A apărut o eroare neașteptată.", "An unexpected error occurred.", "Ocorreu um erro inesperado."),
];

#[derive(Debug, Clone)]
pub struct I18nStore {
    default_lang: String,
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new(DEFAULT_LANG)
    }
}

impl I18nStore {
    pub fn new(default_lang: &str) -> Self {
        Self { default_lang: default_lang.to_string() }
    }

    /// Traduz a chave; chaves desconhecidas voltam como estão.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        let Some(entry) = MESSAGES.iter().find(|(k, ..)| *k == key) else {
            return key.to_string();
        };

        let pick = |lang: &str| match lang {
            "ro" => Some(entry.1),
            "en" => Some(entry.2),
            "pt" => Some(entry.3),
            _ => None,
        };

        pick(lang)
            .or_else(|| pick(&self.default_lang))
            .unwrap_or(entry.1)
            .to_string()
    }
}
