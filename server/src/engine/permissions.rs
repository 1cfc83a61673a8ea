use bitflags::bitflags;

bitflags! {
    /// Guild permission bits as the platform numbers them.
    /// Sent over the wire as a decimal string.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        const CREATE_INSTANT_INVITE    = 1 << 0;
        const KICK_MEMBERS             = 1 << 1;
        const BAN_MEMBERS              = 1 << 2;
        const ADMINISTRATOR            = 1 << 3;
        const MANAGE_CHANNELS          = 1 << 4;
        const MANAGE_GUILD             = 1 << 5;
        const SEND_MESSAGES            = 1 << 11;
        const MANAGE_MESSAGES          = 1 << 13;
        const MENTION_EVERYONE         = 1 << 17;
        const MANAGE_ROLES             = 1 << 28;
        const USE_APPLICATION_COMMANDS = 1 << 31;
    }
}

impl Permissions {
    /// Parse the decimal string form. Unknown bits are dropped; garbage yields empty.
    pub fn from_decimal(value: &str) -> Self {
        value
            .trim()
            .parse::<u64>()
            .map(Self::from_bits_truncate)
            .unwrap_or(Self::empty())
    }

    pub fn to_decimal(self) -> String {
        self.bits().to_string()
    }

    /// True if these permissions include `required`, with ADMINISTRATOR implying everything.
    pub fn allows(self, required: Permissions) -> bool {
        self.contains(Self::ADMINISTRATOR) || self.contains(required)
    }
}
