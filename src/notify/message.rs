use crate::engine::Priority;
use crate::lead::types::Lead;
use serde::Serialize;

/// Webhook payload: `{recipient, text, instance_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub recipient: String,
    pub text: String,
    pub instance_id: String,
}

/// Multi-line chat text for one new lead (WhatsApp-style `*bold*`).
pub fn format_lead_message(lead: &Lead, priority: Priority) -> String {
    format!(
        "*Novo {kind} Detectado! {stars}*\n\
         Nome: {name}\n\
         Segmento: {segment}\n\
         Faturamento: {revenue}\n\
         Valor Atual: {price}\n\
         Tempo Restante: {remaining}\n\
         \n\
         *Detalhes:*\n\
         - Produto: {product}\n\
         - Canal: {channel}",
        kind = lead.kind,
        stars = priority.indicator(),
        name = lead.name,
        segment = lead.segment,
        revenue = lead.revenue_bracket,
        price = lead.price,
        remaining = lead.remaining_time,
        product = lead.product,
        channel = lead.channel,
    )
}
