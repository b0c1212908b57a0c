//! Connection key construction and normalization.
//!
//! Three variants exist: `direct` (`host:port:user`), `via_jump`
//! (`via_jump/host:port:user`) and `jump` (`jump/host:port:user`). Hosts are
//! normalized by stripping whitespace before the key is built, matching the
//! original `host.replace(" ", "")` behavior.

/// Strips whitespace from a host component before it is folded into a key.
fn normalize_host(host: &str) -> String {
    host.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Builds the cache key for a direct (non-tunneled) connection.
pub fn direct_key(host: &str, port: u16, user: &str) -> String {
    format!("{}:{}:{}", normalize_host(host), port, user)
}

/// Builds the cache key for a connection established over a jump host.
pub fn via_jump_key(host: &str, port: u16, user: &str) -> String {
    format!("via_jump/{}:{}:{}", normalize_host(host), port, user)
}

/// Builds the cache key for the jump host's own session.
pub fn jump_key(host: &str, port: u16, user: &str) -> String {
    format!("jump/{}:{}:{}", normalize_host(host), port, user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_key_strips_whitespace() {
        assert_eq!(direct_key(" 10.0.0.1 ", 22, "root"), "10.0.0.1:22:root");
    }

    #[test]
    fn via_jump_key_has_distinct_prefix() {
        assert_eq!(
            via_jump_key("10.0.0.1", 22, "root"),
            "via_jump/10.0.0.1:22:root"
        );
        assert_ne!(
            via_jump_key("10.0.0.1", 22, "root"),
            direct_key("10.0.0.1", 22, "root")
        );
    }

    #[test]
    fn jump_key_has_distinct_prefix_from_via_jump() {
        assert_ne!(
            jump_key("bastion", 22, "root"),
            via_jump_key("bastion", 22, "root")
        );
    }

    #[test]
    fn two_rows_to_same_host_share_a_key() {
        let a = direct_key("10.0.0.1", 22, "root");
        let b = direct_key("10.0.0.1", 22, "root");
        assert_eq!(a, b);
    }
}
