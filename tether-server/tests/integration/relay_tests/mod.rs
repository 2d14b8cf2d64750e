mod test_relay_isolated_per_room;
mod test_relay_skips_room_checks;
