use models::MonthData;

use crate::{calculate_summary, format_currency, format_percent};

/// Plain-text month summary meant to be pasted into a chat message.
pub fn share_report(month: &MonthData) -> String {
    let summary = calculate_summary(month);
    format!(
        "📊 *Resumo Flat - {period}*\n\
         \n\
         💰 *Faturamento (Airbnb):* {revenue}\n\
         💸 *Despesas Totais:* {expenses}\n\
         🏢 *Taxa Adm ({fee}%):* {admin}\n\
         ✅ *Lucro Final (Líquido):* {profit}\n\
         \n\
         _Relatório gerado via FlatMoney_",
        period = month.period_label(),
        revenue = format_currency(summary.total_revenue),
        expenses = format_currency(summary.total_expenses),
        fee = format_percent(month.admin_fee_percent),
        admin = format_currency(summary.admin_fee_amount),
        profit = format_currency(summary.net_profit),
    )
}
