//! Insight generation — recommendation text for the account manager.
//!
//! Pure function of (score, classification, project, tenure). Branch
//! order is significant: a long-tenured, high-score client must get the
//! escalation message even when the Evolutivo branch would also match.

use crate::pipeline::types::Classification;

/// Generate the account-manager recommendation. First match wins.
pub fn generate_insight(
    churn_score: u8,
    classification: Classification,
    project: &str,
    tenure_years: f32,
) -> String {
    if churn_score > 80 {
        if tenure_years < 1.0 {
            return format!(
                "URGENTE: Cliente nuevo en riesgo crítico. El proyecto '{project}' podría \
                 cancelarse. Ofrecer 1 mes de soporte extendido gratis."
            );
        }
        return "ALERTA: Cliente antiguo insatisfecho. Agendar reunión de emergencia. \
                Ofrecer descuento del 15% en renovación."
            .to_string();
    }

    if churn_score > 60 {
        return format!(
            "Riesgo considerable. Monitorear tickets del proyecto '{project}'. \
             Enviar correo de seguimiento personalizado."
        );
    }

    if classification == Classification::Evolutivo {
        return format!(
            "Oportunidad de Venta: Cliente interesado en mejoras para '{project}'. \
             Ofrecer consultoría o nuevos módulos."
        );
    }

    let months_to_anniversary = (12.0 - tenure_years.fract() * 12.0) as u32;
    format!(
        "Cliente estable. Mantener SLA estándar. Recordar aniversario de contrato \
         en {months_to_anniversary} meses."
    )
}
