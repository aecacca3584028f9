mod simple_network;
