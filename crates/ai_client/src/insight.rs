use models::MonthData;
use summary_engine::{calculate_summary, format_currency, format_percent};

use crate::ChatBackend;

/// Shown instead of the narrative whenever the model cannot be reached.
pub const INSIGHT_FALLBACK: &str =
    "Não foi possível gerar a análise da IA no momento. Verifique se o Ollama está em execução.";

const SYSTEM_PROMPT: &str = "Você é um consultor financeiro que ajuda proprietários de flats de \
aluguel por temporada a entender os números do mês. Responda sempre em português.";

pub fn build_insight_prompt(month: &MonthData) -> String {
    let summary = calculate_summary(month);
    format!(
        "Analise os seguintes dados financeiros de um flat de aluguel por temporada (Airbnb) para o mês de {period}:\n\
         - Faturamento Bruto (Airbnb): {revenue}\n\
         - Despesas Totais: {expenses}\n\
         - Taxa de Administração ({fee}% sobre o Bruto): {admin}\n\
         - Lucro Líquido Final (para distribuição): {profit}\n\
         \n\
         Por favor, forneça um resumo amigável e direto em português (máximo 3 parágrafos) para o dono do flat.\n\
         Diga se o mês foi bom, dê um conselho simples para melhorar e ressalte o Lucro Final (Líquido) que sobrou no bolso.\n\
         Foque na transparência dos gastos e na saúde financeira do flat.\n\
         Use um tom encorajador e profissional.",
        period = month.period_label(),
        revenue = format_currency(summary.total_revenue),
        expenses = format_currency(summary.total_expenses),
        fee = format_percent(month.admin_fee_percent),
        admin = format_currency(summary.admin_fee_amount),
        profit = format_currency(summary.net_profit),
    )
}

/// Narrative summary of one month. Never fails: any backend error or an
/// empty answer yields [`INSIGHT_FALLBACK`].
pub fn month_insight(backend: &dyn ChatBackend, month: &MonthData) -> String {
    let prompt = build_insight_prompt(month);
    match backend.chat(SYSTEM_PROMPT, &prompt) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            tracing::warn!("Model returned an empty insight for {}", month.period_label());
            INSIGHT_FALLBACK.to_string()
        }
        Err(err) => {
            tracing::warn!("Could not generate insight for {}: {:#}", month.period_label(), err);
            INSIGHT_FALLBACK.to_string()
        }
    }
}
