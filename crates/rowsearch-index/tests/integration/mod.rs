mod backend_parity;
