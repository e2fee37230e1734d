use crate::core_error::FtpError;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::session::Session;

use crate::core_ftpcommand::{
    allo, appe, auth, cdup, cwd, dele, feat, help, list, mkd, mode, nlst, noop, pass, pbsz,
    prot, pwd, quit, rest, retr, rmd, rnfr, rnto, size, stat, stor, stru, syst, type_, user,
};
// PASV/EPSV and PORT/EPRT live with the rest of the data-connection code.
use crate::core_network::{pasv, port};

/// Fixed verb-to-handler table. Each handler performs exactly one protocol
/// exchange against the session it is given.
pub async fn dispatch_command(
    command: FtpCommand,
    session: &mut Session,
    arg: String,
) -> Result<(), FtpError> {
    match command {
        FtpCommand::USER => user::handle_user_command(session, arg).await,
        FtpCommand::PASS => pass::handle_pass_command(session, arg).await,
        FtpCommand::QUIT => quit::handle_quit_command(session, arg).await,
        FtpCommand::SYST => syst::handle_syst_command(session, arg).await,
        FtpCommand::FEAT => feat::handle_feat_command(session, arg).await,
        FtpCommand::STAT => stat::handle_stat_command(session, arg).await,
        FtpCommand::NOOP => noop::handle_noop_command(session, arg).await,
        FtpCommand::HELP => help::handle_help_command(session, arg).await,
        FtpCommand::PWD => pwd::handle_pwd_command(session, arg).await,
        FtpCommand::CWD => cwd::handle_cwd_command(session, arg).await,
        FtpCommand::CDUP => cdup::handle_cdup_command(session, arg).await,
        FtpCommand::TYPE => type_::handle_type_command(session, arg).await,
        FtpCommand::MODE => mode::handle_mode_command(session, arg).await,
        FtpCommand::STRU => stru::handle_stru_command(session, arg).await,
        FtpCommand::ALLO => allo::handle_allo_command(session, arg).await,
        FtpCommand::MKD => mkd::handle_mkd_command(session, arg).await,
        FtpCommand::RMD => rmd::handle_rmd_command(session, arg).await,
        FtpCommand::DELE => dele::handle_dele_command(session, arg).await,
        FtpCommand::SIZE => size::handle_size_command(session, arg).await,
        FtpCommand::RNFR => rnfr::handle_rnfr_command(session, arg).await,
        FtpCommand::RNTO => rnto::handle_rnto_command(session, arg).await,
        FtpCommand::LIST => list::handle_list_command(session, arg).await,
        FtpCommand::NLST => nlst::handle_nlst_command(session, arg).await,
        FtpCommand::RETR => retr::handle_retr_command(session, arg).await,
        FtpCommand::STOR => stor::handle_stor_command(session, arg).await,
        FtpCommand::APPE => appe::handle_appe_command(session, arg).await,
        FtpCommand::REST => rest::handle_rest_command(session, arg).await,
        FtpCommand::PASV => pasv::handle_pasv_command(session, arg).await,
        FtpCommand::EPSV => pasv::handle_epsv_command(session, arg).await,
        FtpCommand::PORT => port::handle_port_command(session, arg).await,
        FtpCommand::EPRT => port::handle_eprt_command(session, arg).await,
        FtpCommand::AUTH => auth::handle_auth_command(session, arg).await,
        FtpCommand::PBSZ => pbsz::handle_pbsz_command(session, arg).await,
        FtpCommand::PROT => prot::handle_prot_command(session, arg).await,
    }
}
