pub mod autoresponder_flush;
