use meshcall_core::IceServerConfig;

/// Static connectivity configuration. STUN/TURN endpoints are deployment
/// concerns, not protocol ones.
#[derive(Clone)]
pub struct CallConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: vec!["stun:stun.l.google.com:19302".to_owned()],
                username: None,
                credential: None,
            }],
        }
    }
}
