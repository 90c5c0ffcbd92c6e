//! Plain-text bodies of the account emails.

/// Product name used in subjects and signatures.
const PRODUCT: &str = "AeroSAMEC";

/// A rendered email, ready to be addressed and sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub subject: String,
    pub body: String,
    /// The emailed link without its query string. Safe to log.
    pub link_target: String,
}

/// `link` up to, not including, the `?` that starts the token.
fn link_target(link: &str) -> String {
    link.split_once('?').map_or(link, |(target, _)| target).to_string()
}

const FOOTER: &str = "Si no solicitaste este acceso, ignorá este mensaje.";

pub fn account_created(first_name: &str, temporary_password: &str, link: &str) -> OutgoingEmail {
    OutgoingEmail {
        subject: format!("Acceso a {PRODUCT} – Verificación de cuenta"),
        body: format!(
            "Hola {first_name},\n\n\
             Tu usuario fue creado en el sistema {PRODUCT}.\n\n\
             Contraseña temporal: {temporary_password}\n\n\
             Para activar tu cuenta, ingresá al siguiente enlace:\n{link}\n\n\
             Por seguridad, deberás cambiar tu contraseña al primer ingreso.\n\n\
             --\n{FOOTER}\n"
        ),
        link_target: link_target(link),
    }
}

pub fn verification_resent(first_name: &str, link: &str) -> OutgoingEmail {
    OutgoingEmail {
        subject: format!("{PRODUCT} – Nuevo enlace de verificación"),
        body: format!(
            "Hola {first_name},\n\n\
             Te enviamos un nuevo enlace para activar tu cuenta:\n{link}\n\n\
             El enlace vence en 24 horas.\n\n\
             --\n{FOOTER}\n"
        ),
        link_target: link_target(link),
    }
}

pub fn password_reset(first_name: &str, link: &str) -> OutgoingEmail {
    OutgoingEmail {
        subject: format!("{PRODUCT} – Restablecer contraseña"),
        body: format!(
            "Hola {first_name},\n\n\
             Recibimos un pedido para restablecer tu contraseña.\n\
             Ingresá al siguiente enlace para elegir una nueva:\n{link}\n\n\
             El enlace vence en 1 hora.\n\n\
             --\nSi no pediste este cambio, ignorá este mensaje.\n"
        ),
        link_target: link_target(link),
    }
}
