use crate::name::Name;

/// 默认 Interest 生存期（毫秒），在 `interest_lifetime_ms == 0` 时使用。
pub const DEFAULT_INTEREST_LIFETIME_MS: u32 = 4_000;

/// Nack 的原因码。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NackReason {
    Duplicate,
    NoRoute,
    Congestion,
}

/// Nack 报头：携带原因，附着在 Interest 上表示"这其实是一个 Nack"。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NackHeader {
    pub reason: NackReason,
}

impl NackHeader {
    /// 是否为"初始"报头——即这个 Interest 实质上是携带 Nack 的载体，而不是
    /// 普通的内容请求。由 [`crate::packet::Interest::nack_header`] 的存在与否
    /// 决定；这个方法只是给调用点一个更具语义的名字。
    #[must_use]
    pub fn is_initial(header: &Option<NackHeader>) -> bool {
        header.is_some()
    }
}

/// 内容请求报文。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interest {
    pub name: Name,
    pub nonce: u64,
    pub ttl: u8,
    pub interest_lifetime_ms: u32,
    pub must_be_fresh: bool,
    pub incoming_face_id: Option<u64>,
    pub nack_header: Option<NackHeader>,
}

impl Interest {
    #[must_use]
    pub fn new(name: Name, nonce: u64, ttl: u8) -> Self {
        Self {
            name,
            nonce,
            ttl,
            interest_lifetime_ms: DEFAULT_INTEREST_LIFETIME_MS,
            must_be_fresh: false,
            incoming_face_id: None,
            nack_header: None,
        }
    }

    /// 生效的生存期：`0` 被解释为默认值，而非"立即过期"。
    #[must_use]
    pub fn effective_lifetime_ms(&self) -> u32 {
        if self.interest_lifetime_ms == 0 {
            DEFAULT_INTEREST_LIFETIME_MS
        } else {
            self.interest_lifetime_ms
        }
    }

    #[must_use]
    pub fn is_nack_carrier(&self) -> bool {
        NackHeader::is_initial(&self.nack_header)
    }
}

/// 内容响应报文。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Data {
    pub name: Name,
    pub ttl: u8,
    pub freshness_period_ms: u32,
    pub no_cache: bool,
    pub payload: Vec<u8>,
}

impl Data {
    #[must_use]
    pub fn new(name: Name, payload: Vec<u8>) -> Self {
        Self {
            name,
            ttl: u8::MAX,
            freshness_period_ms: 0,
            no_cache: false,
            payload,
        }
    }
}

/// 负向确认报文：携带触发它的 Interest 与原因码。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nack {
    pub interest: Interest,
    pub reason: NackReason,
}

/// 推送模式报文：按 `dst_identifier` 直接寻路，不经过 PIT。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GpPkt {
    pub src_identifier: Name,
    pub dst_identifier: Name,
    pub ttl: u8,
    pub payload: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_lifetime_falls_back_to_default() {
        let mut i = Interest::new(Name::root(), 1, 3);
        i.interest_lifetime_ms = 0;
        assert_eq!(i.effective_lifetime_ms(), DEFAULT_INTEREST_LIFETIME_MS);
        i.interest_lifetime_ms = 900;
        assert_eq!(i.effective_lifetime_ms(), 900);
    }

    #[test]
    fn nack_carrier_detection() {
        let mut i = Interest::new(Name::root(), 1, 3);
        assert!(!i.is_nack_carrier());
        i.nack_header = Some(NackHeader { reason: NackReason::Duplicate });
        assert!(i.is_nack_carrier());
    }
}
