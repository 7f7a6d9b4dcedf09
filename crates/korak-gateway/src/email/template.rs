//! Welcome email copy, localized per signup locale.

/// Template name used as the `template` metric label.
pub const WELCOME_TEMPLATE: &str = "welcome";

struct Wording {
    greet_named: &'static str,
    greet_anon: &'static str,
    body: &'static str,
    sign_off: &'static str,
    team: &'static str,
}

const EN: Wording = Wording {
    greet_named: "Hi {name},",
    greet_anon: "Hi there,",
    body: "Welcome to Slovenščina Korak za Korakom! We're glad you're here. \
           Your account is ready, so you can book your first lesson or join a language club whenever you like.",
    sign_off: "See you soon,",
    team: "The Korak za Korakom team",
};

const SL: Wording = Wording {
    greet_named: "Živjo {name},",
    greet_anon: "Živjo,",
    body: "Dobrodošli v Slovenščina Korak za Korakom! Veseli nas, da ste z nami. \
           Vaš račun je pripravljen, zato lahko kadar koli rezervirate prvo uro ali se pridružite jezikovnemu klubu.",
    sign_off: "Se vidimo kmalu,",
    team: "Ekipa Korak za Korakom",
};

const RU: Wording = Wording {
    greet_named: "Здравствуйте, {name}!",
    greet_anon: "Здравствуйте!",
    body: "Добро пожаловать в Slovenščina Korak za Korakom! Мы рады, что вы с нами. \
           Ваш аккаунт готов: вы можете записаться на первый урок или присоединиться к языковому клубу в любое время.",
    sign_off: "До скорой встречи,",
    team: "Команда Korak za Korakom",
};

const IT: Wording = Wording {
    greet_named: "Ciao {name},",
    greet_anon: "Ciao,",
    body: "Benvenuto in Slovenščina Korak za Korakom! Siamo felici di averti con noi. \
           Il tuo account è pronto: puoi prenotare la tua prima lezione o unirti a un club linguistico quando vuoi.",
    sign_off: "A presto,",
    team: "Il team di Korak za Korakom",
};

fn wording_for(locale: &str) -> &'static Wording {
    match locale {
        "sl" => &SL,
        "ru" => &RU,
        "it" => &IT,
        _ => &EN,
    }
}

/// Rendered welcome content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    pub text: String,
}

/// Render the welcome email. Unknown locales get the English copy; a missing
/// or blank name gets the anonymous greeting.
pub fn render_welcome(name: Option<&str>, locale: &str) -> Rendered {
    let w = wording_for(locale);
    let name = name.map(str::trim).filter(|n| !n.is_empty());

    let (greet_text, greet_html) = match name {
        Some(n) => (
            w.greet_named.replace("{name}", n),
            w.greet_named.replace("{name}", &escape_html(n)),
        ),
        None => (w.greet_anon.to_string(), w.greet_anon.to_string()),
    };

    let text = format!(
        "{greet_text}\n\n{}\n\n{}\n{}\n",
        w.body, w.sign_off, w.team
    );
    let html = format!(
        "<!DOCTYPE html><html lang=\"{lang}\"><body>\
         <p>{greet_html}</p><p>{}</p><p>{}<br>{}</p>\
         </body></html>",
        w.body,
        w.sign_off,
        w.team,
        lang = escape_html(locale),
    );
    Rendered { html, text }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
