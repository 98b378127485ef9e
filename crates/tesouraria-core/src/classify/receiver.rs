//! Heuristic recovery of the receiver's name from comprovante text.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

lazy_static! {
    /// A line starting with the word "para", optionally followed by a colon.
    static ref PARA_LINE: Regex = Regex::new(r"(?i)^para\b\s*:?\s*").unwrap();

    /// "dados do recebedor" followed, possibly lines later, by "para <name>".
    static ref RECEIVER_SECTION: Regex =
        Regex::new(r"(?i)dados do recebedor[\s\S]*?para\s+(.+?)(?:\n|$)").unwrap();
}

/// Names this short are treated as noise.
const MIN_NAME_LEN: usize = 3;

fn usable(name: &str) -> Option<String> {
    let name = name.trim();
    (name.chars().count() >= MIN_NAME_LEN).then(|| name.to_string())
}

/// Try to find who received a transfer.
///
/// First pass: the first line beginning with "para" (prefix removed).
/// Second pass: a "dados do recebedor ... para <name>" block. Best effort
/// only; `None` when neither yields a name longer than two characters.
pub fn extract_receiver_name(raw_text: &str) -> Option<String> {
    let text = raw_text.replace('\r', "");

    for line in text.lines() {
        let line = line.trim();
        if let Some(prefix) = PARA_LINE.find(line) {
            if let Some(name) = usable(&line[prefix.end()..]) {
                trace!("Receiver name from 'para' line: {}", name);
                return Some(name);
            }
        }
    }

    let caps = RECEIVER_SECTION.captures(&text)?;
    let name = usable(caps.get(1)?.as_str())?;
    trace!("Receiver name from receiver section: {}", name);
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_para_line() {
        let text = "Comprovante de PIX\r\nValor: R$ 50,00\r\n  Para: Maria Silva  \r\nBanco X";
        assert_eq!(extract_receiver_name(text).as_deref(), Some("Maria Silva"));
    }

    #[test]
    fn test_para_line_without_colon() {
        assert_eq!(extract_receiver_name("PARA JOSE SOUZA\n").as_deref(), Some("JOSE SOUZA"));
    }

    #[test]
    fn test_short_para_line_is_skipped() {
        let text = "Para: AB\nPara Carlos Lima";
        assert_eq!(extract_receiver_name(text).as_deref(), Some("Carlos Lima"));
    }

    #[test]
    fn test_word_starting_with_para_is_not_a_prefix() {
        assert_eq!(extract_receiver_name("Parabéns pelo pagamento"), None);
    }

    #[test]
    fn test_receiver_section() {
        let text = "Dados do Recebedor\nNome e instituição enviada para Ana Paula Costa\nCPF ***";
        assert_eq!(extract_receiver_name(text).as_deref(), Some("Ana Paula Costa"));
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(extract_receiver_name(""), None);
        assert_eq!(extract_receiver_name("Valor R$ 10,00\nData 01/01/2024"), None);
    }
}
