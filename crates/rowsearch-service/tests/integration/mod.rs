mod consistency;
mod end_to_end;
mod on_disk;
mod token_ranges;
