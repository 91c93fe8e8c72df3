pub mod chats;
