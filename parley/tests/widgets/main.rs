mod attachment_card_test;
mod image_preview_test;
mod message_list_logic_test;
mod message_list_test;
mod notification_bar_test;
