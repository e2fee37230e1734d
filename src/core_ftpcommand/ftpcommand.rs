#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    QUIT,
    SYST,
    FEAT,
    STAT,
    NOOP,
    HELP,
    PWD,
    CWD,
    CDUP,
    TYPE,
    MODE,
    STRU,
    ALLO,
    MKD,
    RMD,
    DELE,
    SIZE,
    RNFR,
    RNTO,
    LIST,
    NLST,
    RETR,
    STOR,
    APPE,
    REST,
    PASV,
    EPSV,
    PORT,
    EPRT,
    AUTH,
    PBSZ,
    PROT,
}

impl FtpCommand {
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "QUIT" => Some(FtpCommand::QUIT),
            "SYST" => Some(FtpCommand::SYST),
            "FEAT" => Some(FtpCommand::FEAT),
            "STAT" => Some(FtpCommand::STAT),
            "NOOP" => Some(FtpCommand::NOOP),
            "HELP" => Some(FtpCommand::HELP),
            "PWD" => Some(FtpCommand::PWD),
            "CWD" => Some(FtpCommand::CWD),
            "CDUP" => Some(FtpCommand::CDUP),
            "TYPE" => Some(FtpCommand::TYPE),
            "MODE" => Some(FtpCommand::MODE),
            "STRU" => Some(FtpCommand::STRU),
            "ALLO" => Some(FtpCommand::ALLO),
            "MKD" => Some(FtpCommand::MKD),
            "RMD" => Some(FtpCommand::RMD),
            "DELE" => Some(FtpCommand::DELE),
            "SIZE" => Some(FtpCommand::SIZE),
            "RNFR" => Some(FtpCommand::RNFR),
            "RNTO" => Some(FtpCommand::RNTO),
            "LIST" => Some(FtpCommand::LIST),
            "NLST" => Some(FtpCommand::NLST),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "APPE" => Some(FtpCommand::APPE),
            "REST" => Some(FtpCommand::REST),
            "PASV" => Some(FtpCommand::PASV),
            "EPSV" => Some(FtpCommand::EPSV),
            "PORT" => Some(FtpCommand::PORT),
            "EPRT" => Some(FtpCommand::EPRT),
            "AUTH" => Some(FtpCommand::AUTH),
            "PBSZ" => Some(FtpCommand::PBSZ),
            "PROT" => Some(FtpCommand::PROT),
            _ => None,
        }
    }

    /// Names listed by HELP, in reply order.
    pub fn all_names() -> &'static [&'static str] {
        &[
            "USER", "PASS", "QUIT", "SYST", "FEAT", "STAT", "NOOP", "HELP", "PWD", "CWD",
            "CDUP", "TYPE", "MODE", "STRU", "ALLO", "MKD", "RMD", "DELE", "SIZE", "RNFR",
            "RNTO", "LIST", "NLST", "RETR", "STOR", "APPE", "REST", "PASV", "EPSV", "PORT",
            "EPRT", "AUTH", "PBSZ", "PROT",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(FtpCommand::from_str("retr"), Some(FtpCommand::RETR));
        assert_eq!(FtpCommand::from_str("Pasv"), Some(FtpCommand::PASV));
    }

    #[test]
    fn unknown_verbs_miss() {
        assert_eq!(FtpCommand::from_str("XYZZY"), None);
        assert_eq!(FtpCommand::from_str(""), None);
    }
}
