//! RFC 3977 response codes used by the Protocol Engine and the client-side
//! path the Peer Synchronizer drives against remote peers.

pub const POSTING_ALLOWED: u16 = 200;
pub const POSTING_PROHIBITED: u16 = 201;
pub const CLOSING_CONNECTION: u16 = 205;
pub const SERVER_DATE: u16 = 111;
pub const HELP_TEXT: u16 = 100;
pub const CAPABILITIES_LIST: u16 = 101;

pub const GROUP_SELECTED: u16 = 211;
pub const LIST_FOLLOWS: u16 = 215;
pub const NEWGROUPS_FOLLOWS: u16 = 231;
pub const NEWNEWS_FOLLOWS: u16 = 230;

pub const ARTICLE_FOLLOWS: u16 = 220;
pub const HEAD_FOLLOWS: u16 = 221;
pub const BODY_FOLLOWS: u16 = 222;
pub const ARTICLE_SELECTED: u16 = 223;

pub const SEND_ARTICLE_FOR_POST: u16 = 340;
pub const POSTED_OK: u16 = 240;
pub const POSTING_NOT_PERMITTED: u16 = 440;
pub const POSTING_FAILED: u16 = 441;

pub const SEND_ARTICLE_FOR_IHAVE: u16 = 335;
pub const TRANSFERRED_OK: u16 = 235;
pub const NOT_WANTED: u16 = 435;
pub const TRANSFER_RETRY: u16 = 436;
pub const TRANSFER_REJECTED: u16 = 437;

pub const AUTH_CONTINUE: u16 = 381;
pub const AUTH_ACCEPTED: u16 = 281;
pub const AUTH_REJECTED: u16 = 481;
pub const AUTH_COMMAND_ORDER: u16 = 482;

pub const NO_SUCH_GROUP: u16 = 411;
pub const NO_GROUP_SELECTED: u16 = 412;
pub const NO_CURRENT_ARTICLE: u16 = 420;
pub const NO_NEXT_ARTICLE: u16 = 421;
pub const NO_PREV_ARTICLE: u16 = 422;
pub const NO_SUCH_ARTICLE_NUMBER: u16 = 423;
pub const NO_SUCH_ARTICLE_ID: u16 = 430;

pub const COMMAND_SYNTAX_ERROR: u16 = 501;
pub const COMMAND_NOT_RECOGNIZED: u16 = 500;
pub const COMMAND_NOT_SUPPORTED: u16 = 503;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_codes_match_rfc_3977() {
        assert_eq!(POSTING_ALLOWED, 200);
        assert_eq!(CLOSING_CONNECTION, 205);
        assert_eq!(GROUP_SELECTED, 211);
        assert_eq!(NO_SUCH_GROUP, 411);
        assert_eq!(COMMAND_SYNTAX_ERROR, 501);
    }
}
